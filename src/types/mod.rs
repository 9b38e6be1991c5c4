//! Common Types Module
//!
//! 요청 값 검증용 newtype. 생성에 성공하면 형식이 보장됨
//! (API 핸들러와 지갑 클라이언트가 함께 사용)

use std::fmt;

use ethers::types::U256;
use ethers::utils::parse_ether;
use serde::{Deserialize, Serialize};

/// ETH 소수점 자릿수
pub const ETHER_DECIMALS: usize = 18;

/// Ethereum 주소 타입 (lowercase 정규화)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EthAddress(String);

impl EthAddress {
    /// `0x` + 40 hex. 체크섬 표기도 허용하고 lowercase로 저장
    pub fn parse(addr: &str) -> Result<Self, String> {
        let addr = addr.trim().to_lowercase();
        if is_hex_with_prefix(&addr, 40) {
            Ok(Self(addr))
        } else {
            Err("Invalid Ethereum address".to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 트랜잭션 해시 (`0x` + 64 hex, lowercase)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHash(String);

impl TxHash {
    pub fn parse(hash: &str) -> Result<Self, String> {
        let hash = hash.trim().to_lowercase();
        if is_hex_with_prefix(&hash, 64) {
            Ok(Self(hash))
        } else {
            Err("Invalid transaction hash".to_string())
        }
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// ETH 금액 (10진 문자열 원본 + wei 값)
///
/// "0.01" 같은 사람이 읽는 형태를 그대로 저장하고, 전송 시에는 wei 사용
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtherAmount {
    text: String,
    wei: U256,
}

impl EtherAmount {
    /// 양수, 소수점 18자리 이하만 허용 (지수 표기/음수 거부)
    pub fn parse(amount: &str) -> Result<Self, String> {
        let text = amount.trim();
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (text, None),
        };

        let digits_ok = !int_part.is_empty()
            && int_part.chars().all(|c| c.is_ascii_digit())
            && frac_part.map_or(true, |f| !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()));
        if !digits_ok {
            return Err("Amount must be a decimal number".to_string());
        }
        if frac_part.map_or(0, str::len) > ETHER_DECIMALS {
            return Err(format!("Amount supports at most {} decimals", ETHER_DECIMALS));
        }

        let wei = parse_ether(text).map_err(|e| format!("Invalid amount: {}", e))?;
        if wei.is_zero() {
            return Err("Please enter a valid amount".to_string());
        }

        Ok(Self { text: text.to_string(), wei })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn wei(&self) -> U256 {
        self.wei
    }
}

/// 사용자명 (3~32자, 영문/숫자/밑줄)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    pub fn parse(name: &str) -> Result<Self, String> {
        let name = name.trim();
        let len_ok = (3..=32).contains(&name.chars().count());
        if len_ok && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Ok(Self(name.to_string()))
        } else {
            Err("Username must be 3-32 characters of letters, digits or '_'".to_string())
        }
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

fn is_hex_with_prefix(value: &str, hex_len: usize) -> bool {
    value.len() == hex_len + 2
        && value.starts_with("0x")
        && value[2..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eth_address_valid() {
        let addr = EthAddress::parse("0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0").unwrap();
        assert_eq!(addr.as_str(), "0x742d35cc6634c0532925a3b844bc9e7595f0beb0");
    }

    #[test]
    fn test_eth_address_invalid() {
        assert!(EthAddress::parse("invalid").is_err());
        // 39자리 (데모 주소처럼 한 글자 모자란 경우)
        assert!(EthAddress::parse("0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb").is_err());
        assert!(EthAddress::parse("0xzz2d35cc6634c0532925a3b844bc9e7595f0beb0").is_err());
    }

    #[test]
    fn test_tx_hash() {
        let hash = format!("0x{}", "AB".repeat(32));
        assert_eq!(TxHash::parse(&hash).unwrap().into_inner(), format!("0x{}", "ab".repeat(32)));
        assert!(TxHash::parse("0x1234").is_err());
    }

    #[test]
    fn test_amount_parse() {
        let amount = EtherAmount::parse("0.01").unwrap();
        assert_eq!(amount.as_str(), "0.01");
        assert_eq!(amount.wei(), U256::from(10_000_000_000_000_000u64));

        let whole = EtherAmount::parse("2").unwrap();
        assert_eq!(whole.wei(), U256::from(2_000_000_000_000_000_000u128));
    }

    #[test]
    fn test_amount_rejects_bad_input() {
        for bad in ["", "0", "0.000", "-1", "1e5", "abc", ".5", "1.", "1.2.3"] {
            assert!(EtherAmount::parse(bad).is_err(), "accepted {:?}", bad);
        }
        assert!(EtherAmount::parse("0.0000000000000000001").is_err());
        assert!(EtherAmount::parse("0.000000000000000001").is_ok());
    }

    #[test]
    fn test_username() {
        assert!(Username::parse("alice_01").is_ok());
        assert!(Username::parse("ab").is_err());
        assert!(Username::parse("has space").is_err());
    }
}
