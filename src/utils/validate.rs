use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    // 用户名长度校验：5 <= x <= 16
    if username.len() < 5 || username.len() > 16 {
        return Err("Username length must be between 5 and 16 characters");
    }
    // 用户名格式校验：只能包含字母、数字、下划线或连字符
    if !USERNAME_RE.is_match(username) {
        return Err("Username must contain only letters, numbers, underscores or hyphens");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    // 邮箱格式校验：必须包含 @ 和 .
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 -]{5,18}[0-9]$").expect("Invalid phone regex"));

/// 家长、教职工联系电话：数字，可带国际区号前缀、空格或连字符
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    if !PHONE_RE.is_match(phone.trim()) {
        return Err("Phone number format is invalid");
    }
    Ok(())
}

/// 学号、工号：非空，不超过 32 个字符
pub fn validate_code(code: &str) -> Result<(), &'static str> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err("Code must not be empty");
    }
    if trimmed.chars().count() > 32 {
        return Err("Code must be at most 32 characters");
    }
    Ok(())
}

// 常见弱密码，比较时忽略大小写
const COMMON_PASSWORDS: &[&str] = &[
    "password1",
    "qwerty123",
    "abcd1234",
    "admin1234",
    "welcome1",
    "school123",
    "passw0rd",
];

type PasswordRule = (fn(&str) -> bool, &'static str);

const PASSWORD_RULES: &[PasswordRule] = &[
    (
        |p| p.chars().count() >= 8,
        "Password must be at least 8 characters long",
    ),
    (
        |p| p.chars().any(|c| c.is_ascii_uppercase()),
        "Password must contain at least one uppercase letter",
    ),
    (
        |p| p.chars().any(|c| c.is_ascii_lowercase()),
        "Password must contain at least one lowercase letter",
    ),
    (
        |p| p.chars().any(|c| c.is_ascii_digit()),
        "Password must contain at least one digit",
    ),
    (
        |p| !COMMON_PASSWORDS.iter().any(|w| p.eq_ignore_ascii_case(w)),
        "Password is too common, please choose a stronger password",
    ),
];

/// 返回所有未满足的密码规则
pub fn password_violations(password: &str) -> Vec<&'static str> {
    PASSWORD_RULES
        .iter()
        .filter(|(check, _)| !check(password))
        .map(|(_, message)| *message)
        .collect()
}

/// 密码策略：至少 8 位，包含大小写字母和数字，且不是常见弱密码
pub fn validate_password_simple(password: &str) -> Result<(), String> {
    let violations = password_violations(password);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_and_email() {
        assert!(validate_username("clerk_01").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("bad name!").is_err());
        assert!(validate_email("office@school.edu").is_ok());
        assert!(validate_email("office@school").is_err());
    }

    #[test]
    fn test_phone_and_code() {
        assert!(validate_phone("+91 98765-43210").is_ok());
        assert!(validate_phone("13800138000").is_ok());
        assert!(validate_phone("call me").is_err());
        assert!(validate_code(" ADM-2025-001 ").is_ok());
        assert!(validate_code("   ").is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password_simple("SecurePass123").is_ok());
        assert!(validate_password_simple("Fees2025ok").is_ok());

        assert_eq!(
            password_violations("Ab1"),
            vec!["Password must be at least 8 characters long"]
        );
        assert_eq!(
            password_violations("abcd12345"),
            vec!["Password must contain at least one uppercase letter"]
        );
        assert!(
            password_violations("School123")
                .contains(&"Password is too common, please choose a stronger password")
        );
    }

    #[test]
    fn test_violations_are_joined() {
        let err = validate_password_simple("abcdefgh").unwrap_err();
        assert_eq!(
            err,
            "Password must contain at least one uppercase letter; \
             Password must contain at least one digit"
        );
    }
}
