//! Unit tests for feed field normalization.

use super::*;

mod normalize_quantity_tests {
    use super::*;

    #[test]
    fn overflow_sentinel_is_capped() {
        assert_eq!(normalize_quantity("A", ">10").unwrap(), 100);
        assert_eq!(normalize_quantity("A", OVERFLOW_SENTINEL).unwrap(), OVERFLOW_QUANTITY);
    }

    #[test]
    fn single_unit_is_out_of_stock() {
        assert_eq!(normalize_quantity("A", "1").unwrap(), 0);
    }

    #[test]
    fn plain_integer_passes_through() {
        assert_eq!(normalize_quantity("A", "7").unwrap(), 7);
        assert_eq!(normalize_quantity("A", "0").unwrap(), 0);
        assert_eq!(normalize_quantity("A", "2").unwrap(), 2);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(normalize_quantity("A", " >10 ").unwrap(), 100);
        assert_eq!(normalize_quantity("A", "1 ").unwrap(), 0);
    }

    #[test]
    fn fails_for_garbage() {
        let err = normalize_quantity("SKU-9", "many").unwrap_err();
        match err {
            SyncError::MalformedQuantity { offer_id, value } => {
                assert_eq!(offer_id, "SKU-9");
                assert_eq!(value, "many");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fails_for_negative_and_empty() {
        assert!(normalize_quantity("A", "-3").is_err());
        assert!(normalize_quantity("A", "").is_err());
    }
}

mod normalize_price_tests {
    use super::*;

    #[test]
    fn strips_separators_and_currency() {
        assert_eq!(normalize_price("5'990.00 руб.").unwrap(), "5990");
    }

    #[test]
    fn simple_amount() {
        assert_eq!(normalize_price("100.00 x").unwrap(), "100");
        assert_eq!(normalize_price("1 250.50").unwrap(), "1250");
    }

    #[test]
    fn fails_without_period() {
        assert!(matches!(
            normalize_price("5990 руб"),
            Err(SyncError::MalformedPrice(_))
        ));
    }

    #[test]
    fn fails_without_digits_before_period() {
        assert!(normalize_price(".99").is_err());
        assert!(normalize_price("руб.").is_err());
    }

    #[test]
    fn parses_amount() {
        assert_eq!(parse_price_amount("5'990.00 руб.").unwrap(), 5990);
        assert!(parse_price_amount("free").is_err());
    }
}
