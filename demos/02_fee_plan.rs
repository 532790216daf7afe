/// fee plan - split semester fees and pay installments through the scheduler
use chrono::{NaiveDate, TimeZone, Utc};
use school_pay_rs::{
    FeePlan, Money, PaymentScheduler, PaymentsConfig, SafeTimeProvider, StubGateway, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
    ));
    let config = PaymentsConfig::for_testing();
    let gateway = StubGateway::new(Money::from_major(2_000_000), config.submission_delay_ms);
    let mut scheduler = PaymentScheduler::new(config, gateway)?;

    let first_due = NaiveDate::from_ymd_opt(2026, 11, 1).ok_or("bad date")?;
    let mut plan = FeePlan::split("2026/2027 First Semester", Money::from_major(750_000), 3, first_due)?;

    // pay the first installment
    if let Some(next) = plan.next_pending().map(|i| i.id.clone()) {
        let form = plan.payment_form(&next, "1", "1", time.now())?;
        let draft = scheduler.prepare(&form, &time)?;
        scheduler.confirm(&scheduler.confirmation(&draft), "9012345678", &time)?;
        plan.mark_paid(&next)?;
    }

    println!("{}", serde_json::to_string_pretty(&plan)?);
    println!(
        "paid {} of {} ({}), {:?}, {} days left",
        plan.paid_amount().formatted_fixed(),
        plan.total_amount().formatted_fixed(),
        plan.progress(),
        plan.status(),
        plan.days_left(time.now().date_naive())
    );

    Ok(())
}
