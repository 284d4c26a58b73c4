//! 核心宏定义
//!
//! 配置结构体的默认值统一用宏声明

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// use script_host::impl_default;
///
/// struct Window {
///     title: String,
///     visible: bool,
/// }
///
/// impl_default!(Window {
///     title: "playground".to_string(),
///     visible: true,
/// });
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}
