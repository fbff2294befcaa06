use super::{async_trait, bool_gauge, status_gauge, Collector, CollectorContext};
use crate::sink::{GaugeDesc, MetricSink};

/// Collects limits and status of the account the token belongs to.
pub struct AccountCollector {
    ctx: CollectorContext,
    droplet_limit: GaugeDesc,
    floating_ip_limit: GaugeDesc,
    email_verified: GaugeDesc,
    status: GaugeDesc,
}

impl AccountCollector {
    pub fn new(ctx: CollectorContext) -> Self {
        ctx.errors.init("account");

        Self {
            ctx,
            droplet_limit: GaugeDesc::new(
                "digitalocean_account_droplet_limit",
                "The maximum number of droplet you can use",
                &[],
            ),
            floating_ip_limit: GaugeDesc::new(
                "digitalocean_account_floating_ip_limit",
                "The maximum number of floating ips you can use",
                &[],
            ),
            email_verified: GaugeDesc::new(
                "digitalocean_account_verified",
                "1 if your email address was verified",
                &[],
            ),
            status: GaugeDesc::new(
                "digitalocean_account_status",
                "The status of your account",
                &["status"],
            ),
        }
    }
}

#[async_trait]
impl Collector for AccountCollector {
    fn name(&self) -> &'static str {
        "account"
    }

    fn describe(&self) -> Vec<&GaugeDesc> {
        vec![
            &self.droplet_limit,
            &self.floating_ip_limit,
            &self.email_verified,
            &self.status,
        ]
    }

    async fn collect(&self, sink: &mut MetricSink) {
        let account = match self.ctx.bounded(self.ctx.client.account()).await {
            Ok(account) => account,
            Err(e) => {
                self.ctx.record_failure(self.name(), "can't get account", &e);
                return;
            }
        };

        let none: &[&str] = &[];
        sink.gauge(&self.droplet_limit, account.droplet_limit as f64, none);
        sink.gauge(&self.floating_ip_limit, account.floating_ip_limit as f64, none);
        sink.gauge(&self.email_verified, bool_gauge(account.email_verified), none);
        sink.gauge(
            &self.status,
            status_gauge(&account.status, "active"),
            &[account.status.as_str()],
        );
    }
}
