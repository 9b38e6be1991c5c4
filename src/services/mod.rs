//! Services Module
//!
//! 비즈니스 로직을 담당하는 서비스 레이어
//!
//! # Services
//! - `TipService`: 사용자/팁 기록과 조회 뷰 구성
//! - `tipping`: 지갑 전송 → API 기록 흐름 (클라이언트 측)

mod tips;
pub mod tipping;

pub use tips::{TipService, UserProfile, TipWithParties, ReceivedTip, PROFILE_RECENT_TIPS};
