//! The manufacturing orders domain the dashboard is built on: which queries
//! it runs, how a `raw` row becomes a [`Pedido`], and the charts' aggregates.

use std::collections::BTreeMap;

use serde::Serialize;

pub mod queries;
pub mod record;
pub mod report;

pub use record::Pedido;
pub use report::{PedidoField, PedidoFilter};

use report::{
    MachineProduction, SectionAverage, SectionTotal, StatusCount, TABLE_FILTER_FIELDS,
};

/// Everything the dashboard needs for one date window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total: usize,
    pub status_counts: Vec<StatusCount>,
    pub average_duration_by_section: Vec<SectionAverage>,
    pub total_duration_by_section: Vec<SectionTotal>,
    pub production_by_machine: Vec<MachineProduction>,
    /// Choices for the table filters, computed before `filter` is applied.
    pub filter_options: BTreeMap<&'static str, Vec<String>>,
}

impl DashboardSummary {
    pub fn build(pedidos: &[Pedido], filter: &PedidoFilter) -> Self {
        let filter_options = TABLE_FILTER_FIELDS
            .iter()
            .map(|field| (field.name(), report::unique_values(pedidos, *field)))
            .collect();

        let selected = filter.apply(pedidos);

        Self {
            total: selected.len(),
            status_counts: report::status_counts(selected.iter().copied()),
            average_duration_by_section: report::average_duration_by_section(
                selected.iter().copied(),
            ),
            total_duration_by_section: report::total_duration_by_section(
                selected.iter().copied(),
            ),
            production_by_machine: report::production_by_machine(selected.iter().copied()),
            filter_options,
        }
    }
}
