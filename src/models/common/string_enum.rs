//! 字符串枚举宏
//!
//! 数据库中以字符串保存的枚举（角色、状态、缴费方式等）统一由该宏生成，
//! 保证 `Display` / `FromStr` / serde 使用同一组取值。

/// 定义一个与固定字符串一一对应的枚举
///
/// 自动生成：
/// - `as_str()` 与 `ALL` 常量
/// - `Display` / `FromStr`
/// - 基于字符串的 `Serialize` / `Deserialize`（错误信息列出全部合法取值）
#[macro_export]
macro_rules! define_string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $value:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)*
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)*
                    _ => Err(format!(
                        "Invalid {}: '{}'. Supported values: {}",
                        stringify!($name),
                        s,
                        [$($value),*].join(", ")
                    )),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    define_string_enum! {
        enum Color {
            Red => "red",
            DarkBlue => "dark_blue",
        }
    }

    #[test]
    fn test_round_trip_through_str() {
        assert_eq!("dark_blue".parse::<Color>(), Ok(Color::DarkBlue));
        assert_eq!(Color::Red.to_string(), "red");
        assert_eq!(Color::ALL.len(), 2);
    }

    #[test]
    fn test_invalid_value_lists_supported() {
        let err = "green".parse::<Color>().unwrap_err();
        assert!(err.contains("red, dark_blue"));

        let json_err = serde_json::from_str::<Color>("\"green\"").unwrap_err();
        assert!(json_err.to_string().contains("Invalid Color"));
    }
}
