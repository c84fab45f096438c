//! Aggregates the dashboard charts are drawn from, plus the table filters.

use std::{fmt::Display, str::FromStr};

use serde::Serialize;

use crate::{
    AthenaError,
    errors::{ErrorKind, error},
    pedidos::record::Pedido,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PedidoField {
    Pedido,
    Op,
    Referencia,
    Maquina,
    Seccion,
    Proceso,
    Usuario,
    Estado,
    Fabricadas,
    FechaInicio,
    FechaFin,
    Duracion,
    DuracionMin,
    Ayudante,
    InfoExtra1,
}

/// Fields the dashboard table can be filtered on.
pub const TABLE_FILTER_FIELDS: [PedidoField; 5] = [
    PedidoField::Maquina,
    PedidoField::Usuario,
    PedidoField::Estado,
    PedidoField::Pedido,
    PedidoField::Op,
];

impl PedidoField {
    pub const ALL: [PedidoField; 15] = [
        PedidoField::Pedido,
        PedidoField::Op,
        PedidoField::Referencia,
        PedidoField::Maquina,
        PedidoField::Seccion,
        PedidoField::Proceso,
        PedidoField::Usuario,
        PedidoField::Estado,
        PedidoField::Fabricadas,
        PedidoField::FechaInicio,
        PedidoField::FechaFin,
        PedidoField::Duracion,
        PedidoField::DuracionMin,
        PedidoField::Ayudante,
        PedidoField::InfoExtra1,
    ];

    /// The serialized field name, e.g. `FechaInicio` or `OP`.
    pub fn name(&self) -> &'static str {
        match self {
            PedidoField::Pedido => "Pedido",
            PedidoField::Op => "OP",
            PedidoField::Referencia => "Referencia",
            PedidoField::Maquina => "Maquina",
            PedidoField::Seccion => "Seccion",
            PedidoField::Proceso => "Proceso",
            PedidoField::Usuario => "Usuario",
            PedidoField::Estado => "Estado",
            PedidoField::Fabricadas => "Fabricadas",
            PedidoField::FechaInicio => "FechaInicio",
            PedidoField::FechaFin => "FechaFin",
            PedidoField::Duracion => "Duracion",
            PedidoField::DuracionMin => "DuracionMin",
            PedidoField::Ayudante => "Ayudante",
            PedidoField::InfoExtra1 => "InfoExtra1",
        }
    }

    /// The field's value rendered as text, the form filters compare on.
    pub fn value_of(&self, pedido: &Pedido) -> String {
        match self {
            PedidoField::Pedido => pedido.pedido.to_string(),
            PedidoField::Op => pedido.op.to_string(),
            PedidoField::Referencia => pedido.referencia.clone(),
            PedidoField::Maquina => pedido.maquina.clone(),
            PedidoField::Seccion => pedido.seccion.clone(),
            PedidoField::Proceso => pedido.proceso.clone(),
            PedidoField::Usuario => pedido.usuario.clone(),
            PedidoField::Estado => pedido.estado.clone(),
            PedidoField::Fabricadas => pedido.fabricadas.to_string(),
            PedidoField::FechaInicio => pedido.fecha_inicio.clone(),
            PedidoField::FechaFin => pedido.fecha_fin.clone(),
            PedidoField::Duracion => pedido.duracion.clone(),
            PedidoField::DuracionMin => pedido.duracion_min.to_string(),
            PedidoField::Ayudante => pedido.ayudante.clone(),
            PedidoField::InfoExtra1 => pedido.info_extra1.clone(),
        }
    }
}

impl FromStr for PedidoField {
    type Err = AthenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PedidoField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or(error!(
                kind = ErrorKind::Config,
                format!("unknown pedido field '{s}'")
            ))
    }
}

impl Display for PedidoField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Equality conditions over pedido fields. A pedido matches when every
/// condition holds; an empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PedidoFilter {
    conditions: Vec<(PedidoField, String)>,
}

impl PedidoFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition. An empty value means "any" and is ignored.
    pub fn with(mut self, field: PedidoField, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.conditions.retain(|(f, _)| *f != field);
            self.conditions.push((field, value));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, pedido: &Pedido) -> bool {
        self.conditions
            .iter()
            .all(|(field, value)| field.value_of(pedido) == *value)
    }

    pub fn apply<'a>(&self, pedidos: &'a [Pedido]) -> Vec<&'a Pedido> {
        pedidos.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct non-empty values of `field`, in first-seen order.
pub fn unique_values<'a>(pedidos: impl IntoIterator<Item = &'a Pedido>, field: PedidoField) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for pedido in pedidos {
        let value = field.value_of(pedido);
        if !value.is_empty() && !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionAverage {
    pub name: String,
    pub promedio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SectionTotal {
    pub seccion: String,
    pub duracion_min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MachineProduction {
    pub machine: String,
    pub fabricadas: i64,
}

/// Groups by `key` keeping first-seen order and folds each group with `fold`.
fn group_by<'a, A>(
    pedidos: impl IntoIterator<Item = &'a Pedido>,
    key: impl Fn(&Pedido) -> &str,
    init: impl Fn() -> A,
    fold: impl Fn(&mut A, &Pedido),
) -> Vec<(String, A)> {
    let mut groups: Vec<(String, A)> = Vec::new();
    for pedido in pedidos {
        let k = key(pedido);
        let idx = match groups.iter().position(|(name, _)| name == k) {
            Some(idx) => idx,
            None => {
                groups.push((k.to_string(), init()));
                groups.len() - 1
            }
        };
        fold(&mut groups[idx].1, pedido);
    }
    groups
}

pub fn status_counts<'a>(pedidos: impl IntoIterator<Item = &'a Pedido>) -> Vec<StatusCount> {
    group_by(pedidos, |p| &p.estado, || 0u64, |count, _| *count += 1)
        .into_iter()
        .map(|(name, value)| StatusCount { name, value })
        .collect()
}

pub fn average_duration_by_section<'a>(
    pedidos: impl IntoIterator<Item = &'a Pedido>,
) -> Vec<SectionAverage> {
    group_by(
        pedidos,
        |p| &p.seccion,
        || (0.0f64, 0u64),
        |(total, count), p| {
            *total += p.duracion_min;
            *count += 1;
        },
    )
    .into_iter()
    .map(|(name, (total, count))| SectionAverage {
        name,
        promedio: total / count as f64,
    })
    .collect()
}

/// Sorted by total duration, longest first. Ties keep first-seen order.
pub fn total_duration_by_section<'a>(
    pedidos: impl IntoIterator<Item = &'a Pedido>,
) -> Vec<SectionTotal> {
    let mut totals: Vec<SectionTotal> = group_by(
        pedidos,
        |p| &p.seccion,
        || 0.0f64,
        |total, p| *total += p.duracion_min,
    )
    .into_iter()
    .map(|(seccion, duracion_min)| SectionTotal {
        seccion,
        duracion_min,
    })
    .collect();

    totals.sort_by(|a, b| b.duracion_min.total_cmp(&a.duracion_min));
    totals
}

/// Total `Fabricadas` per machine, saturating at the integer bounds.
pub fn production_by_machine<'a>(
    pedidos: impl IntoIterator<Item = &'a Pedido>,
) -> Vec<MachineProduction> {
    group_by(
        pedidos,
        |p| &p.maquina,
        || 0i64,
        |total, p| *total = total.saturating_add(p.fabricadas),
    )
    .into_iter()
    .map(|(machine, fabricadas)| MachineProduction {
        machine,
        fabricadas,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pedido(id: i64, estado: &str, seccion: &str, maquina: &str, fabricadas: i64, minutos: f64) -> Pedido {
        Pedido {
            pedido: id,
            op: id * 10,
            referencia: format!("REF-{id}"),
            maquina: maquina.into(),
            seccion: seccion.into(),
            proceso: "Laser".into(),
            usuario: "ana".into(),
            estado: estado.into(),
            fabricadas,
            fecha_inicio: "2024-01-02".into(),
            fecha_fin: "2024-01-02".into(),
            duracion: String::new(),
            duracion_min: minutos,
            ayudante: String::new(),
            info_extra1: String::new(),
        }
    }

    fn sample() -> Vec<Pedido> {
        vec![
            pedido(1, "Terminado", "Corte", "M1", 100, 30.0),
            pedido(2, "En curso", "Soldadura", "M2", 50, 90.0),
            pedido(3, "Terminado", "Corte", "M1", 2500, 10.0),
            pedido(4, "Parado", "Pintura", "M3", 0, 45.0),
        ]
    }

    #[test]
    fn counts_statuses_in_first_seen_order() {
        let counts = status_counts(&sample());
        assert_eq!(
            counts,
            vec![
                StatusCount { name: "Terminado".into(), value: 2 },
                StatusCount { name: "En curso".into(), value: 1 },
                StatusCount { name: "Parado".into(), value: 1 },
            ]
        );
    }

    #[test]
    fn averages_and_totals_by_section() {
        let pedidos = sample();

        let averages = average_duration_by_section(&pedidos);
        assert_eq!(averages[0], SectionAverage { name: "Corte".into(), promedio: 20.0 });
        assert_eq!(averages.len(), 3);

        let totals = total_duration_by_section(&pedidos);
        let order: Vec<_> = totals.iter().map(|t| (t.seccion.as_str(), t.duracion_min)).collect();
        assert_eq!(order, [("Soldadura", 90.0), ("Pintura", 45.0), ("Corte", 40.0)]);
    }

    #[test]
    fn sums_production_per_machine() {
        let production = production_by_machine(&sample());
        assert_eq!(production[0], MachineProduction { machine: "M1".into(), fabricadas: 2600 });
        assert_eq!(production[2].fabricadas, 0);

        let json = serde_json::to_value(&production[0]).unwrap();
        assert_eq!(json, serde_json::json!({ "Machine": "M1", "Fabricadas": 2600 }));
    }

    #[test]
    fn production_saturates_instead_of_overflowing() {
        let pedidos = vec![
            pedido(1, "Terminado", "Corte", "M1", i64::MAX, 0.0),
            pedido(2, "Terminado", "Corte", "M1", 10, 0.0),
        ];
        assert_eq!(production_by_machine(&pedidos)[0].fabricadas, i64::MAX);
    }

    #[test]
    fn filters_require_every_condition() {
        let pedidos = sample();

        let filter = PedidoFilter::new()
            .with(PedidoField::Estado, "Terminado")
            .with(PedidoField::Maquina, "M1")
            .with(PedidoField::Usuario, "");
        let ids: Vec<_> = filter.apply(&pedidos).iter().map(|p| p.pedido).collect();
        assert_eq!(ids, [1, 3]);

        let by_op = PedidoFilter::new().with(PedidoField::Op, "20");
        assert_eq!(by_op.apply(&pedidos).len(), 1);

        assert_eq!(PedidoFilter::new().apply(&pedidos).len(), 4);
    }

    #[test]
    fn unique_values_skip_empties() {
        let mut pedidos = sample();
        pedidos[3].maquina = String::new();

        assert_eq!(unique_values(&pedidos, PedidoField::Maquina), ["M1", "M2"]);
        assert_eq!(unique_values(&pedidos, PedidoField::Ayudante), Vec::<String>::new());
    }

    #[test]
    fn field_names_round_trip() {
        for field in PedidoField::ALL {
            assert_eq!(field.name().parse::<PedidoField>().unwrap(), field);
        }
        assert!("Op".parse::<PedidoField>().is_err());
    }
}
