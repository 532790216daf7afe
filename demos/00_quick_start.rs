/// quick start - schedule one school fee payment
use school_pay_rs::{PaymentScheduler, PaymentsConfig, Money, SafeTimeProvider, StubGateway, TimeSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = PaymentsConfig::default();
    let gateway = StubGateway::new(Money::from_major(500_000), config.submission_delay_ms);
    let mut scheduler = PaymentScheduler::new(config, gateway)?;
    let time = SafeTimeProvider::new(TimeSource::System);

    // tuition at a school with its own collection account
    let form = scheduler
        .new_form(&time)
        .school("1")
        .purpose("1")
        .amount("150000");
    let draft = scheduler.prepare(&form, &time)?;

    // what the confirmation screen shows
    println!("{}", scheduler.summary(&draft)?.to_json_pretty()?);

    let params = scheduler.confirmation(&draft);
    let item = scheduler.confirm(&params, "9012345678", &time)?;
    println!("scheduled {} for {}", item.formatted_amount, item.school_name);
    println!("balance left: {}", scheduler.gateway().balance().formatted_fixed());

    Ok(())
}
