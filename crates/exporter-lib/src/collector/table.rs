//! Declarative fetch/label/emit pipeline
//!
//! A `ResourceTable` pairs one label projection with a list of gauge
//! columns. `ListingCollector` drains a paginated collection and runs the
//! table over it, so most resource kinds are just a table definition.

use super::{async_trait, Collector, CollectorContext};
use crate::client::Listable;
use crate::sink::{GaugeDesc, MetricSink};
use tracing::debug;

type ValueFn<T> = Box<dyn Fn(&T) -> Option<f64> + Send + Sync>;

struct Column<T> {
    desc: GaugeDesc,
    value: ValueFn<T>,
}

/// Label projection plus gauge columns for one resource kind
pub struct ResourceTable<T> {
    label_names: &'static [&'static str],
    labels: fn(&T) -> Option<Vec<String>>,
    columns: Vec<Column<T>>,
}

impl<T: 'static> ResourceTable<T> {
    /// `labels` returns `None` for items missing a field the label tuple
    /// needs; such items are skipped.
    pub fn new(label_names: &'static [&'static str], labels: fn(&T) -> Option<Vec<String>>) -> Self {
        Self {
            label_names,
            labels,
            columns: Vec::new(),
        }
    }

    /// Column emitted for every item
    pub fn gauge(self, name: &str, help: &str, value: fn(&T) -> f64) -> Self {
        self.optional_gauge(name, help, move |item| Some(value(item)))
    }

    /// Column emitted only for items where `value` returns `Some`
    pub fn optional_gauge<F>(mut self, name: &str, help: &str, value: F) -> Self
    where
        F: Fn(&T) -> Option<f64> + Send + Sync + 'static,
    {
        self.columns.push(Column {
            desc: GaugeDesc::new(name, help, self.label_names),
            value: Box::new(value),
        });
        self
    }

    pub fn descriptors(&self) -> Vec<&GaugeDesc> {
        self.columns.iter().map(|column| &column.desc).collect()
    }

    /// Write one sample per column per item. Returns the number of items
    /// skipped for lack of labels.
    pub fn emit(&self, items: &[T], sink: &mut MetricSink) -> usize {
        let mut skipped = 0;

        for item in items {
            let Some(labels) = (self.labels)(item) else {
                skipped += 1;
                continue;
            };

            for column in &self.columns {
                if let Some(value) = (column.value)(item) {
                    sink.gauge(&column.desc, value, &labels);
                }
            }
        }

        skipped
    }
}

/// Collector for a paginated resource kind described by a `ResourceTable`
pub struct ListingCollector<T> {
    name: &'static str,
    ctx: CollectorContext,
    table: ResourceTable<T>,
}

impl<T: Listable> ListingCollector<T> {
    pub fn from_table(name: &'static str, ctx: CollectorContext, table: ResourceTable<T>) -> Self {
        ctx.errors.init(name);
        Self { name, ctx, table }
    }
}

#[async_trait]
impl<T: Listable> Collector for ListingCollector<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn describe(&self) -> Vec<&GaugeDesc> {
        self.table.descriptors()
    }

    async fn collect(&self, sink: &mut MetricSink) {
        let paged = self.ctx.client.list_all::<T>(self.ctx.deadline()).await;

        if let Some(err) = &paged.error {
            self.ctx
                .record_failure(self.name, &format!("can't list {}", T::KEY), err);
        }

        let skipped = self.table.emit(&paged.items, sink);
        if skipped > 0 {
            debug!(
                collector = self.name,
                skipped = skipped,
                "Skipped resources missing label fields"
            );
        }
    }
}
