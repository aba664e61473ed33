use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::credit_cards_model::{CardCharge, CardUtilization, ChargeCounts, CreditCard, NextBilling};
use super::credit_cards_traits::{CreditCardRepositoryTrait, CreditCardServiceTrait};
use crate::constants::{MONEY_PRECISION, PERCENT_PRECISION};
use crate::errors::{Error, Result};
use crate::fx::CurrencyConverterTrait;
use crate::ledger::{EntrySource, EntryType, NewLedgerEntry, OccurrenceLookup};
use crate::obligations::{Obligation, ObligationKind, ObligationRepositoryTrait};
use crate::recurring::{
    BatchOutcome, ChargeBatch, ChargeStoreTrait, ItemOutcome, LeaseRegistry, ProcessSummary,
    ProcessedItem,
};
use crate::utils::time_utils::{add_months, clamp_day_in_month, month_start};

/// A card due for billing with its charges already priced.
struct PendingBill {
    card: CreditCard,
    total: Decimal,
    charge_count: usize,
}

/// Aggregates the obligations linked to a card into utilization figures,
/// upcoming statements and the daily billing entries.
pub struct CreditCardBillingAggregator {
    card_repository: Arc<dyn CreditCardRepositoryTrait>,
    obligation_repository: Arc<dyn ObligationRepositoryTrait>,
    store: Arc<dyn ChargeStoreTrait>,
    leases: Arc<LeaseRegistry>,
    converter: Arc<dyn CurrencyConverterTrait>,
}

impl CreditCardBillingAggregator {
    pub fn new(
        card_repository: Arc<dyn CreditCardRepositoryTrait>,
        obligation_repository: Arc<dyn ObligationRepositoryTrait>,
        store: Arc<dyn ChargeStoreTrait>,
        leases: Arc<LeaseRegistry>,
        converter: Arc<dyn CurrencyConverterTrait>,
    ) -> Self {
        Self {
            card_repository,
            obligation_repository,
            store,
            leases,
            converter,
        }
    }

    /// Next statement date: this month's billing day if it has not passed,
    /// otherwise next month's.
    pub fn next_billing_date(billing_day: u32, today: NaiveDate) -> NaiveDate {
        if today.day() <= billing_day {
            clamp_day_in_month(today, billing_day)
        } else {
            clamp_day_in_month(add_months(month_start(today), 1), billing_day)
        }
    }

    /// Linked obligations that still charge the card as of `date`.
    fn is_charging(obligation: &Obligation, date: NaiveDate) -> bool {
        let counted_kind = match obligation.kind {
            ObligationKind::Installment | ObligationKind::Subscription => true,
            ObligationKind::FixedItem => obligation.entry_type == EntryType::Expense,
            ObligationKind::Loan => false,
        };
        counted_kind
            && obligation.is_open()
            && obligation.end_date.map_or(true, |end| end >= date)
    }

    /// Monthly-equivalent contribution of each charging obligation.
    pub fn monthly_charges(obligations: &[Obligation], today: NaiveDate) -> Vec<(Obligation, Decimal)> {
        obligations
            .iter()
            .filter(|o| Self::is_charging(o, today))
            .map(|o| (o.clone(), o.monthly_equivalent()))
            .collect()
    }

    /// Amount each charging obligation puts on the statement dated
    /// `billing_date`. Subscriptions only appear in the months they bill,
    /// at their full cycle amount.
    pub fn statement_charges(
        obligations: &[Obligation],
        billing_date: NaiveDate,
    ) -> Vec<(Obligation, Decimal)> {
        obligations
            .iter()
            .filter(|o| Self::is_charging(o, billing_date))
            .filter(|o| {
                let due = o.due_date_in_month(billing_date);
                match o.kind {
                    ObligationKind::Subscription => o.is_due_on(due),
                    _ => o.start_date <= billing_date,
                }
            })
            .map(|o| (o.clone(), o.amount))
            .collect()
    }

    async fn to_card_charges(
        &self,
        card: &CreditCard,
        priced: Vec<(Obligation, Decimal)>,
    ) -> Vec<CardCharge> {
        let mut charges = Vec::with_capacity(priced.len());
        for (obligation, amount) in priced {
            let converted = self
                .converter
                .convert(amount, &obligation.currency, &card.currency)
                .await;
            charges.push(CardCharge {
                obligation_id: obligation.id.clone(),
                name: obligation.name.clone(),
                kind: obligation.kind,
                amount: converted.round_dp(MONEY_PRECISION),
                original_amount: amount,
                original_currency: obligation.currency.clone(),
            });
        }
        charges
    }

    fn get_card(&self, credit_card_id: &str) -> Result<CreditCard> {
        self.card_repository
            .get_by_id(credit_card_id)?
            .ok_or_else(|| Error::NotFound(format!("Credit card {}", credit_card_id)))
    }

    async fn next_billing_for(&self, card: &CreditCard, today: NaiveDate) -> Result<NextBilling> {
        let billing_date = Self::next_billing_date(card.billing_day, today);
        let linked = self.obligation_repository.list_by_credit_card(&card.id)?;
        let charges = self
            .to_card_charges(card, Self::statement_charges(&linked, billing_date))
            .await;
        let total_charge: Decimal = charges.iter().map(|c| c.amount).sum();

        Ok(NextBilling {
            credit_card_id: card.id.clone(),
            currency: card.currency.clone(),
            billing_date,
            charges,
            total_charge,
            remaining_after_charge: card.credit_limit - total_charge,
        })
    }

    fn bill_cards(
        batch: &mut dyn ChargeBatch,
        leases: &Arc<LeaseRegistry>,
        owner_id: &str,
        date: NaiveDate,
        preview: bool,
        bills: Vec<PendingBill>,
    ) -> Result<BatchOutcome> {
        let mut summary = ProcessSummary::new(owner_id, date, preview);
        let mut held = Vec::new();

        for bill in bills {
            let card = &bill.card;
            let Some(account_id) = card.linked_account_id.clone() else {
                summary.record(
                    ProcessedItem::for_card(card, date, ItemOutcome::Skipped)
                        .with_message("No linked account"),
                );
                continue;
            };
            if bill.total <= Decimal::ZERO {
                summary.record(
                    ProcessedItem::for_card(card, date, ItemOutcome::Skipped)
                        .with_message("No charges to bill"),
                );
                continue;
            }

            if preview {
                let item = match batch.find_card_billing_entry(&card.id, date) {
                    Ok(OccurrenceLookup::Found(existing)) => {
                        ProcessedItem::for_card(card, date, ItemOutcome::Skipped)
                            .with_message(format!("Already billed as entry {}", existing.id))
                    }
                    Ok(OccurrenceLookup::NotFound) => {
                        ProcessedItem::card_would_bill(card, date, bill.total)
                    }
                    Err(e) => ProcessedItem::for_card(card, date, ItemOutcome::Failed)
                        .with_message(e.to_string()),
                };
                summary.record(item);
                continue;
            }

            let Some(lease) = leases.try_acquire(LeaseRegistry::card_key(&card.id)) else {
                warn!(
                    "Credit card {} of owner {} is leased by another run; deferring {}",
                    card.id, owner_id, date
                );
                summary.record(
                    ProcessedItem::for_card(card, date, ItemOutcome::Deferred)
                        .with_message("Card is being billed by another run"),
                );
                continue;
            };
            held.push(lease);

            let mut outcome = None;
            let result = batch.savepoint(&mut |b: &mut dyn ChargeBatch| {
                if let OccurrenceLookup::Found(existing) = b.find_card_billing_entry(&card.id, date)? {
                    outcome = Some(
                        ProcessedItem::for_card(card, date, ItemOutcome::Skipped)
                            .with_amount(existing.amount, &existing.currency)
                            .with_message(format!("Already billed as entry {}", existing.id)),
                    );
                    return Ok(());
                }

                let entry = NewLedgerEntry {
                    id: None,
                    owner_id: card.owner_id.clone(),
                    entry_type: EntryType::Expense,
                    amount: bill.total,
                    currency: card.currency.clone(),
                    date,
                    category_id: None,
                    account_id: Some(account_id.clone()),
                    credit_card_id: Some(card.id.clone()),
                    description: Some(format!(
                        "{} statement ({} charges)",
                        card.name, bill.charge_count
                    )),
                    obligation_id: None,
                    occurrence_number: None,
                    is_recurring: true,
                    source: EntrySource::CardBilling,
                };
                entry.validate()?;
                let created = b.insert_entry(entry)?;
                outcome = Some(ProcessedItem::card_billed(card, &created));
                Ok(())
            });

            match (result, outcome) {
                (Ok(()), Some(item)) => summary.record(item),
                (Ok(()), None) => {}
                (Err(e), _) => {
                    error!(
                        "Failed to bill credit card {} of owner {} for {}: {}",
                        card.id, owner_id, date, e
                    );
                    summary.record(
                        ProcessedItem::for_card(card, date, ItemOutcome::Failed)
                            .with_message(e.to_string()),
                    );
                }
            }
        }

        Ok(BatchOutcome {
            summary,
            leases: held,
        })
    }
}

#[async_trait]
impl CreditCardServiceTrait for CreditCardBillingAggregator {
    async fn utilization(&self, credit_card_id: &str, today: NaiveDate) -> Result<CardUtilization> {
        let card = self.get_card(credit_card_id)?;
        let linked = self.obligation_repository.list_by_credit_card(&card.id)?;

        let monthly = Self::monthly_charges(&linked, today);
        let mut counts = ChargeCounts::default();
        for (obligation, _) in &monthly {
            counts.count(obligation.kind);
        }
        let charges = self.to_card_charges(&card, monthly).await;
        let total: Decimal = charges.iter().map(|c| c.amount).sum();

        let utilization_percentage = if card.credit_limit > Decimal::ZERO {
            (total / card.credit_limit * Decimal::ONE_HUNDRED).round_dp(PERCENT_PRECISION)
        } else {
            Decimal::ZERO
        };

        Ok(CardUtilization {
            credit_card_id: card.id.clone(),
            currency: card.currency.clone(),
            credit_limit: card.credit_limit,
            total_monthly_charges: total,
            utilization_percentage,
            available_credit: card.credit_limit - total,
            counts_by_source_type: counts,
            charges,
        })
    }

    async fn next_billing(&self, credit_card_id: &str, today: NaiveDate) -> Result<NextBilling> {
        let card = self.get_card(credit_card_id)?;
        self.next_billing_for(&card, today).await
    }

    async fn bill_due_cards(
        &self,
        owner_id: &str,
        date: NaiveDate,
        preview: bool,
    ) -> Result<ProcessSummary> {
        let due_cards: Vec<CreditCard> = self
            .card_repository
            .list_by_owner(owner_id)?
            .into_iter()
            .filter(|c| c.is_active && c.billing_day == date.day())
            .collect();
        if due_cards.is_empty() {
            return Ok(ProcessSummary::new(owner_id, date, preview));
        }

        // Rates are resolved up front; the batch itself cannot await.
        let mut bills = Vec::with_capacity(due_cards.len());
        for card in due_cards {
            let statement = self.next_billing_for(&card, date).await?;
            debug!(
                "Card {} statement for {}: {} charge(s) totalling {} {}",
                card.id,
                date,
                statement.charges.len(),
                statement.total_charge,
                card.currency
            );
            bills.push(PendingBill {
                total: statement.total_charge,
                charge_count: statement.charges.len(),
                card,
            });
        }

        let owner = owner_id.to_string();
        let leases = Arc::clone(&self.leases);
        let outcome = self
            .store
            .run_batch(Box::new(move |batch: &mut dyn ChargeBatch| {
                Self::bill_cards(batch, &leases, &owner, date, preview, bills)
            }))
            .await
            .inspect_err(|e| {
                error!(
                    "Card billing pass for owner {} on {} rolled back: {}",
                    owner_id, date, e
                )
            })?;

        let summary = outcome.release();
        info!(
            "Card billing owner={} date={} preview={}: billed={} skipped={} deferred={} failed={}",
            summary.owner_id,
            summary.reference_date,
            summary.preview,
            summary.created,
            summary.skipped,
            summary.deferred,
            summary.failed
        );
        Ok(summary)
    }
}
