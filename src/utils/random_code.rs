use rand::Rng;
use rand::distr::Alphanumeric;

const RECEIPT_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// 生成指定长度的随机字母数字串
pub fn generate_random_code(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// 生成收据编号：`{prefix}-{yyyymmdd}-{随机6位}`
///
/// 随机部分去掉了容易混淆的 0/O、1/I。
pub fn generate_receipt_number(prefix: &str, date: chrono::NaiveDate) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..6)
        .map(|_| RECEIPT_CHARSET[rng.random_range(0..RECEIPT_CHARSET.len())] as char)
        .collect();
    format!("{}-{}-{}", prefix, date.format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_code_length() {
        let code = generate_random_code(16);
        assert_eq!(code.len(), 16);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_receipt_number_format() {
        let date = chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let receipt = generate_receipt_number("RCP", date);
        let parts: Vec<&str> = receipt.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "RCP");
        assert_eq!(parts[1], "20250601");
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].bytes().all(|b| RECEIPT_CHARSET.contains(&b)));
    }
}
