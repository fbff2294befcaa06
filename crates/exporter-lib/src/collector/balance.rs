use super::{async_trait, Collector, CollectorContext};
use crate::sink::{GaugeDesc, MetricSink};

/// Collects the billing balance. Amounts that fail to parse are reported
/// as -1.
pub struct BalanceCollector {
    ctx: CollectorContext,
    month_to_date_balance: GaugeDesc,
    account_balance: GaugeDesc,
    month_to_date_usage: GaugeDesc,
    generated_at: GaugeDesc,
}

impl BalanceCollector {
    pub fn new(ctx: CollectorContext) -> Self {
        ctx.errors.init("balance");

        Self {
            ctx,
            month_to_date_balance: GaugeDesc::new(
                "digitalocean_month_to_date_balance",
                "Balance as of the digitalocean_balance_generated_at time",
                &[],
            ),
            account_balance: GaugeDesc::new(
                "digitalocean_account_balance",
                "Current balance of your most recent billing activity",
                &[],
            ),
            month_to_date_usage: GaugeDesc::new(
                "digitalocean_month_to_date_usage",
                "Amount used in the current billing period as of the digitalocean_balance_generated_at time",
                &[],
            ),
            generated_at: GaugeDesc::new(
                "digitalocean_balance_generated_at",
                "The time at which balances were most recently generated",
                &[],
            ),
        }
    }
}

#[async_trait]
impl Collector for BalanceCollector {
    fn name(&self) -> &'static str {
        "balance"
    }

    fn describe(&self) -> Vec<&GaugeDesc> {
        vec![
            &self.month_to_date_balance,
            &self.account_balance,
            &self.month_to_date_usage,
            &self.generated_at,
        ]
    }

    async fn collect(&self, sink: &mut MetricSink) {
        let balance = match self.ctx.bounded(self.ctx.client.balance()).await {
            Ok(balance) => balance,
            Err(e) => {
                self.ctx.record_failure(self.name(), "can't get balance", &e);
                return;
            }
        };

        let none: &[&str] = &[];
        let amounts = [
            (
                &self.month_to_date_balance,
                "month_to_date_balance",
                &balance.month_to_date_balance,
            ),
            (
                &self.account_balance,
                "account_balance",
                &balance.account_balance,
            ),
            (
                &self.month_to_date_usage,
                "month_to_date_usage",
                &balance.month_to_date_usage,
            ),
        ];
        for (desc, field, raw) in amounts {
            let value = self.ctx.parse_or_sentinel(self.name(), field, raw);
            sink.gauge(desc, value, none);
        }

        sink.gauge(
            &self.generated_at,
            balance.generated_at.timestamp() as f64,
            none,
        );
    }
}
