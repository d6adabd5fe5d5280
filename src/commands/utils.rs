use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// Accepts "YYYY-MM-DD" and "YYYYMMDD"; anything else becomes None.
pub fn parse_date_safe(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .ok()
}

/// Customer phone numbers are exactly 10 digits.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit())
}

/// Indian postal pincodes are exactly 6 digits.
pub fn is_valid_pincode(pincode: &str) -> bool {
    pincode.len() == 6 && pincode.bytes().all(|b| b.is_ascii_digit())
}

/// The lead-capture URL a printed QR code points at.
pub fn capture_url(site_url: &str, campaign_id: &str, source_id: &str) -> String {
    format!(
        "{}/campaign/{}?sourceId={}",
        site_url.trim_end_matches('/'),
        campaign_id,
        source_id
    )
}

/// External QR image for the capture URL. Rendering QR codes ourselves is out
/// of scope; printed material links the same generator the frontend used.
pub fn qr_image_url(capture_url: &str) -> String {
    format!(
        "https://api.qrserver.com/v1/create-qr-code/?data={}&size=256x256&bgcolor=ffffff",
        utf8_percent_encode(capture_url, NON_ALPHANUMERIC)
    )
}

pub fn format_otp(n: u32) -> String {
    format!("{:06}", n % 1_000_000)
}

/// Monthly placement cost divided by leads captured there. None until the
/// place has produced at least one lead.
pub fn cost_per_lead(monthly_cost: i32, leads: i64) -> Option<f64> {
    if leads > 0 {
        Some(monthly_cost as f64 / leads as f64)
    } else {
        None
    }
}

pub fn repeat_rate(total_customers: i64, repeat_customers: i64) -> f64 {
    if total_customers > 0 {
        repeat_customers as f64 / total_customers as f64 * 100.0
    } else {
        0.0
    }
}
