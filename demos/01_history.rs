/// payment history - edit, cancel and settle scheduled payments
use chrono::{Duration, TimeZone, Utc};
use school_pay_rs::{
    EditForm, Money, PaymentScheduler, PaymentsConfig, SafeTimeProvider, StatusFilter,
    StubGateway, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    let config = PaymentsConfig::for_testing();
    let gateway = StubGateway::new(Money::from_major(1_000_000), config.submission_delay_ms);
    let mut scheduler = PaymentScheduler::new(config, gateway)?;

    // monthly accommodation at a merchant school
    let rent = scheduler
        .new_form(&time)
        .school("2")
        .purpose("2")
        .amount("45000")
        .recurring(true);
    let draft = scheduler.prepare(&rent, &time)?;
    let rent = scheduler.confirm(&scheduler.confirmation(&draft), "9012345678", &time)?;

    // books at a school without a collection account
    let books = scheduler
        .new_form(&time)
        .school("3")
        .purpose("3")
        .amount("12500.50")
        .account("Technical Institute", "0123456789")
        .scheduled_at(time.now() + Duration::days(3));
    let draft = scheduler.prepare(&books, &time)?;
    let books = scheduler.confirm(&scheduler.confirmation(&draft), "9012345678", &time)?;

    // raise the book budget, then drop it altogether
    let edit = EditForm {
        amount: Some("14,000".to_string()),
        ..EditForm::default()
    };
    scheduler.edit(books.id, &edit, &time)?;
    scheduler.cancel(books.id, &time);

    // a month passes and the rent goes through
    controller.advance(Duration::days(30));
    scheduler.settle(rent.id, &time);

    for filter in [StatusFilter::All, StatusFilter::Completed, StatusFilter::Upcoming] {
        println!("{:?}:", filter);
        for item in scheduler.filter(filter) {
            println!(
                "  {} {} {} ({:?})",
                item.scheduled_at.format("%Y-%m-%d"),
                item.purpose_name,
                item.formatted_amount,
                item.status
            );
        }
    }
    println!("still due: {}", scheduler.history().upcoming_total().formatted_fixed());

    for event in scheduler.take_events() {
        println!("{:?}", event);
    }

    Ok(())
}
