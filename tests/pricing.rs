use sportzone_api::pricing::PricingPolicy;

#[test]
fn charges_flat_shipping_below_the_threshold() {
    let policy = PricingPolicy::default();
    let quote = policy.quote(10_000);

    assert_eq!(quote.subtotal, 10_000);
    assert_eq!(quote.tax, 500);
    assert_eq!(quote.shipping_fee, PricingPolicy::DEFAULT_SHIPPING_FEE);
    assert_eq!(quote.total, 10_000 + 500 + PricingPolicy::DEFAULT_SHIPPING_FEE);
}

#[test]
fn shipping_is_free_at_the_threshold() {
    let policy = PricingPolicy::default();

    let at = policy.quote(PricingPolicy::DEFAULT_FREE_SHIPPING_THRESHOLD);
    assert_eq!(at.shipping_fee, 0);

    let above = policy.quote(PricingPolicy::DEFAULT_FREE_SHIPPING_THRESHOLD + 1);
    assert_eq!(above.shipping_fee, 0);

    let below = policy.quote(PricingPolicy::DEFAULT_FREE_SHIPPING_THRESHOLD - 1);
    assert_eq!(below.shipping_fee, PricingPolicy::DEFAULT_SHIPPING_FEE);
}

#[test]
fn tax_rounds_half_up() {
    let policy = PricingPolicy {
        tax_rate_bps: 500,
        free_shipping_threshold: 100_000,
        shipping_fee: 5_000,
    };

    // 5% of 99 is 4.95, which rounds to 5.
    assert_eq!(policy.quote(99).tax, 5);
    // 5% of 89 is 4.45, which rounds to 4.
    assert_eq!(policy.quote(89).tax, 4);
    // 5% of 90 is 4.50, which rounds to 5.
    assert_eq!(policy.quote(90).tax, 5);
}

#[test]
fn zero_rate_policy_charges_no_tax() {
    let policy = PricingPolicy {
        tax_rate_bps: 0,
        free_shipping_threshold: 0,
        shipping_fee: 5_000,
    };
    let quote = policy.quote(42);

    assert_eq!(quote.tax, 0);
    assert_eq!(quote.shipping_fee, 0);
    assert_eq!(quote.total, 42);
}
