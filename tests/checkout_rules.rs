use phone_accessory_api::{
    middleware::auth::{SessionClaims, decode_session, encode_session},
    services::admin_service::{brand_prefix, build_product_code, category_prefix},
    services::order_service::{format_shipping_address, shipping_fee},
};
use uuid::Uuid;

#[test]
fn shipping_fee_tiers() {
    assert_eq!(shipping_fee(0), 50_000);
    assert_eq!(shipping_fee(99_999), 50_000);
    assert_eq!(shipping_fee(100_000), 30_000);
    assert_eq!(shipping_fee(199_999), 30_000);
    assert_eq!(shipping_fee(200_000), 0);
    assert_eq!(shipping_fee(5_000_000), 0);
}

#[test]
fn order_total_includes_mid_tier_fee() {
    let subtotal = 130_000;
    assert_eq!(subtotal + shipping_fee(subtotal), 160_000);
}

#[test]
fn shipping_address_joins_parts_in_storefront_order() {
    let address = format_shipping_address(
        "12 Nguyễn Trãi",
        "Phường Bến Thành",
        "Quận 1",
        "Thành phố Hồ Chí Minh",
    );
    assert_eq!(
        address,
        "12 Nguyễn Trãi, Phường Bến Thành, Quận 1, Thành phố Hồ Chí Minh"
    );
}

#[test]
fn session_round_trip() {
    let claims = SessionClaims {
        user_id: Uuid::new_v4(),
        role_id: 1,
    };
    let token = encode_session(&claims).expect("encode");
    let decoded = decode_session(&token).expect("decode");
    assert_eq!(decoded, claims);
}

#[test]
fn tampered_session_is_rejected() {
    assert!(decode_session("not-base64!!").is_err());
    // Valid base64 but not a claims payload.
    assert!(decode_session("aGVsbG8gd29ybGQ=").is_err());
}

#[test]
fn product_codes_use_known_category_prefixes() {
    assert_eq!(category_prefix("Ốp lưng"), "OP");
    assert_eq!(category_prefix("Củ sạc"), "CS");
    assert_eq!(category_prefix("Cáp sạc"), "DS");
    assert_eq!(category_prefix("Tai nghe"), "TN");
    assert_eq!(category_prefix("Sạc dự phòng pin"), "SDP");
    assert_eq!(category_prefix("Giá đỡ điện thoại"), "GDT");
    assert_eq!(category_prefix("Loa bluetooth"), "LB");
}

#[test]
fn unknown_category_falls_back_to_first_two_chars() {
    assert_eq!(category_prefix("Miếng dán màn hình"), "MI");
}

#[test]
fn brand_prefix_is_first_three_chars_uppercased() {
    assert_eq!(brand_prefix("Apple"), "APP");
    assert_eq!(brand_prefix("Xiaomi"), "XIA");
    assert_eq!(brand_prefix("JB"), "JB");
}

#[test]
fn product_code_format() {
    assert_eq!(build_product_code("Ốp lưng", "Apple", 1), "OP-APP-0001");
    assert_eq!(build_product_code("Tai nghe", "Sony", 27), "TN-SON-0027");
    assert_eq!(
        build_product_code("Sạc dự phòng pin", "Anker", 12345),
        "SDP-ANK-12345"
    );
}
