use crate::infra::{build_register, seed_demo_owners, InMemoryMessageChannel, ServiceRegister};
use clap::Args;
use property_register::config::AppConfig;
use property_register::error::AppError;
use property_register::register::{OwnerId, PropertyType, RecountSummary};
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct RecountArgs {
    /// Apply the late-payment surcharge instead of charging assessed obligations
    #[arg(long)]
    pub(crate) surcharge: bool,
    /// Number of consecutive passes to run
    #[arg(long, default_value_t = 1)]
    pub(crate) cycles: u32,
}

#[derive(Args, Debug, Default)]
pub(crate) struct NotifyArgs {
    /// Notify a single owner instead of every debtor
    #[arg(long)]
    pub(crate) owner_id: Option<u64>,
}

#[derive(Args, Debug)]
pub(crate) struct RateChangeArgs {
    /// FLAT, HOUSE or OFFICE
    #[arg(value_parser = crate::infra::parse_property_type)]
    pub(crate) property_type: PropertyType,
    /// New rate per unit of area
    #[arg(value_parser = crate::infra::parse_tax)]
    pub(crate) tax: Decimal,
}

pub(crate) fn run_recount(args: RecountArgs) -> Result<(), AppError> {
    let (register, _) = demo_register()?;

    for cycle in 1..=args.cycles.max(1) {
        let summary = if args.surcharge {
            register.recount.accrue_surcharge()?
        } else {
            register.recount.run()?
        };
        println!("Pass {cycle}");
        render_summary(&summary);
        render_balances(&register)?;
    }

    Ok(())
}

pub(crate) fn run_notify(args: NotifyArgs) -> Result<(), AppError> {
    let (register, channel) = demo_register()?;
    let summary = register.recount.run()?;
    render_summary(&summary);

    match args.owner_id {
        Some(owner_id) => {
            let event = register
                .notifications
                .notify_debtor_by_id(OwnerId(owner_id))?;
            println!("Notified {} <{}>", owner_id, event.email);
        }
        None => {
            let dispatch = register.notifications.notify_all_debtors()?;
            println!(
                "Notified {} debtor(s), {} failure(s)",
                dispatch.notified.len(),
                dispatch.failed.len()
            );
            for failure in &dispatch.failed {
                println!("- #{}: {}", failure.owner_id, failure.reason);
            }
        }
    }

    println!("\nEvents on '{}'", register.notifications.topic());
    for message in channel.messages() {
        println!("- {}", message.payload);
    }
    Ok(())
}

pub(crate) fn run_list_rates() -> Result<(), AppError> {
    let (register, _) = demo_register()?;
    render_rates(&register);
    Ok(())
}

pub(crate) fn run_change_rate(args: RateChangeArgs) -> Result<(), AppError> {
    let (register, _) = demo_register()?;
    if !register.rates.change_tax(args.property_type, args.tax) {
        return Err(AppError::UnknownPropertyType(
            args.property_type.label().to_string(),
        ));
    }
    render_rates(&register);

    println!("\nObligations under the new table");
    for owner in register.owners.all_owners()? {
        let obligation = register.owners.count_tax_obligation(owner.id)?;
        println!("- {} (#{}): {}", owner.full_name(), owner.id, obligation);
    }
    Ok(())
}

fn demo_register() -> Result<(Arc<ServiceRegister>, Arc<InMemoryMessageChannel>), AppError> {
    let config = AppConfig::load()?;
    let (register, channel) = build_register(&config.register);
    seed_demo_owners(&register)?;
    Ok((register, channel))
}

fn render_summary(summary: &RecountSummary) {
    println!(
        "{:?} pass: {} processed, {} failed",
        summary.kind,
        summary.processed,
        summary.failed.len()
    );
    for failure in &summary.failed {
        println!("- #{} skipped: {}", failure.owner_id, failure.reason);
    }
}

fn render_balances(register: &ServiceRegister) -> Result<(), AppError> {
    for owner in register.owners.all_owners()? {
        println!(
            "- {} (#{}): debt {}",
            owner.full_name(),
            owner.id,
            owner.taxes_debt
        );
    }
    Ok(())
}

fn render_rates(register: &ServiceRegister) {
    println!("Tax rates");
    for rate in register.rates.get_all() {
        println!("- {}: {}", rate.property_type.label(), rate.tax);
    }
}
