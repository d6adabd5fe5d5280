#[cfg(test)]
mod tests {
    use crate::commands::utils::{
        capture_url, cost_per_lead, format_otp, is_valid_phone, is_valid_pincode, parse_date_safe,
        qr_image_url, repeat_rate,
    };
    use chrono::NaiveDate;

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("9876543210"));
        assert!(!is_valid_phone("987654321")); // 9 digits
        assert!(!is_valid_phone("98765432100")); // 11 digits
        assert!(!is_valid_phone("98765abc10"));
        assert!(!is_valid_phone(""));
        // Separators are not accepted; the form strips them client-side.
        assert!(!is_valid_phone("98765-4321"));
    }

    #[test]
    fn test_pincode_validation() {
        assert!(is_valid_pincode("560034"));
        assert!(!is_valid_pincode("56003"));
        assert!(!is_valid_pincode("5600345"));
        assert!(!is_valid_pincode("56OO34"));
    }

    #[test]
    fn test_date_parsing() {
        assert_eq!(
            parse_date_safe("2023-10-27"),
            Some(NaiveDate::from_ymd_opt(2023, 10, 27).unwrap())
        );
        assert_eq!(
            parse_date_safe("20231027"),
            Some(NaiveDate::from_ymd_opt(2023, 10, 27).unwrap())
        );
        assert_eq!(parse_date_safe("invalid"), None);
        assert_eq!(parse_date_safe(""), None);
    }

    #[test]
    fn test_capture_url_builds_qr_target() {
        let url = capture_url("http://localhost:3000", "CAM-AB12CD34", "SRC-9F3A21BC");
        assert_eq!(
            url,
            "http://localhost:3000/campaign/CAM-AB12CD34?sourceId=SRC-9F3A21BC"
        );
        // Trailing slash on the site URL must not double up.
        let url2 = capture_url("http://localhost:3000/", "CAM-AB12CD34", "SRC-9F3A21BC");
        assert_eq!(url, url2);
    }

    #[test]
    fn test_qr_image_url_encodes_target() {
        let img = qr_image_url("http://localhost:3000/campaign/CAM-1?sourceId=SRC-2");
        assert!(img.starts_with("https://api.qrserver.com/v1/create-qr-code/?data="));
        // The embedded URL must be percent-encoded.
        assert!(!img.contains("?sourceId"));
        assert!(img.contains("%3FsourceId%3DSRC%2D2"));
        assert!(img.ends_with("&size=256x256&bgcolor=ffffff"));
    }

    #[test]
    fn test_otp_formatting() {
        assert_eq!(format_otp(0), "000000");
        assert_eq!(format_otp(42), "000042");
        assert_eq!(format_otp(999_999), "999999");
        // Out-of-range inputs wrap into the 6-digit space.
        assert_eq!(format_otp(1_000_001), "000001");
    }

    #[test]
    fn test_cost_per_lead() {
        assert_eq!(cost_per_lead(5000, 100), Some(50.0));
        assert_eq!(cost_per_lead(5000, 3), Some(5000.0 / 3.0));
        // Undefined until the place produces a lead.
        assert_eq!(cost_per_lead(5000, 0), None);
        assert_eq!(cost_per_lead(0, 10), Some(0.0));
    }

    #[test]
    fn test_repeat_rate() {
        assert_eq!(repeat_rate(0, 0), 0.0);
        assert_eq!(repeat_rate(200, 50), 25.0);
        assert_eq!(repeat_rate(3, 1), 1.0 / 3.0 * 100.0);
    }
}
