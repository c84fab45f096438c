use serde::{Deserialize, Serialize};

use crate::{
    AthenaError,
    errors::{ErrorKind, error},
};

/// Number of columns in the `raw` table.
pub const PEDIDO_COLUMNS: usize = 15;

/// One manufacturing order, as the dashboard consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pedido {
    pub pedido: i64,
    #[serde(rename = "OP")]
    pub op: i64,
    pub referencia: String,
    pub maquina: String,
    pub seccion: String,
    pub proceso: String,
    pub usuario: String,
    pub estado: String,
    pub fabricadas: i64,
    pub fecha_inicio: String,
    pub fecha_fin: String,
    pub duracion: String,
    pub duracion_min: f64,
    pub ayudante: String,
    pub info_extra1: String,
}

impl Pedido {
    /// Parses a full row of the `raw` table, columns in table order.
    ///
    /// `Pedido` and `OP` are required. Missing counts and durations read as
    /// zero, missing text as an empty string.
    pub fn from_row(cells: &[Option<String>]) -> Result<Self, AthenaError> {
        if cells.len() < PEDIDO_COLUMNS {
            return Err(error!(
                kind = ErrorKind::Decode,
                format!(
                    "expected {PEDIDO_COLUMNS} columns for a pedido, got {}",
                    cells.len()
                )
            ));
        }

        let text = |idx: usize| cells[idx].clone().unwrap_or_default();

        Ok(Pedido {
            pedido: required_integer(cells, 0, "Pedido")?,
            op: required_integer(cells, 1, "OP")?,
            referencia: text(2),
            maquina: text(3),
            seccion: text(4),
            proceso: text(5),
            usuario: text(6),
            estado: text(7),
            fabricadas: optional_integer(cells, 8, "Fabricadas")?.unwrap_or(0),
            fecha_inicio: text(9),
            fecha_fin: text(10),
            duracion: text(11),
            duracion_min: optional_number(cells, 12, "DuracionMin")?.unwrap_or(0.0),
            ayudante: text(13),
            info_extra1: text(14),
        })
    }

    pub fn from_rows(rows: &[Vec<Option<String>>]) -> Result<Vec<Self>, AthenaError> {
        rows.iter().map(|row| Pedido::from_row(row)).collect()
    }
}

fn cell(cells: &[Option<String>], idx: usize) -> Option<&str> {
    cells[idx].as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn optional_number(
    cells: &[Option<String>],
    idx: usize,
    field: &str,
) -> Result<Option<f64>, AthenaError> {
    cell(cells, idx)
        .map(|raw| {
            raw.parse::<f64>().map_err(|e| {
                error!(
                    kind = ErrorKind::Decode,
                    format!("{field} is not a number: '{raw}' ({e})")
                )
            })
        })
        .transpose()
}

// i64 bounds as floats; the upper one is 2^63 and itself out of range.
const MIN_INTEGER: f64 = i64::MIN as f64;
const MAX_INTEGER: f64 = i64::MAX as f64;

/// Accepts `12` as well as `12.0`, which is how some exports write counts.
fn optional_integer(
    cells: &[Option<String>],
    idx: usize,
    field: &str,
) -> Result<Option<i64>, AthenaError> {
    let Some(raw) = cell(cells, idx) else {
        return Ok(None);
    };

    if let Ok(value) = raw.parse::<i64>() {
        return Ok(Some(value));
    }

    match raw.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value >= MIN_INTEGER && value < MAX_INTEGER => {
            Ok(Some(value as i64))
        }
        _ => Err(error!(
            kind = ErrorKind::Decode,
            format!("{field} is not an integer: '{raw}'")
        )),
    }
}

fn required_integer(cells: &[Option<String>], idx: usize, field: &str) -> Result<i64, AthenaError> {
    optional_integer(cells, idx, field)?.ok_or(error!(
        kind = ErrorKind::Decode,
        format!("{field} is missing")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: [&str; PEDIDO_COLUMNS]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| (!v.is_empty()).then(|| v.to_string()))
            .collect()
    }

    fn sample() -> [&'static str; PEDIDO_COLUMNS] {
        [
            "1001", "77", "REF-9", "M1", "Corte", "Laser", "ana", "Terminado", "40",
            "2024-01-02 08:00:00", "2024-01-02 09:30:00", "01:30:00", "90.5", "", "urgente",
        ]
    }

    #[test]
    fn parses_a_full_row() {
        let pedido = Pedido::from_row(&row(sample())).unwrap();

        assert_eq!(pedido.pedido, 1001);
        assert_eq!(pedido.op, 77);
        assert_eq!(pedido.maquina, "M1");
        assert_eq!(pedido.fabricadas, 40);
        assert_eq!(pedido.duracion_min, 90.5);
        assert_eq!(pedido.ayudante, "");
        assert_eq!(pedido.info_extra1, "urgente");
    }

    #[test]
    fn serializes_with_dashboard_names() {
        let json = serde_json::to_value(Pedido::from_row(&row(sample())).unwrap()).unwrap();

        assert_eq!(json["OP"], 77);
        assert_eq!(json["DuracionMin"], 90.5);
        assert_eq!(json["InfoExtra1"], "urgente");
        assert_eq!(json["FechaInicio"], "2024-01-02 08:00:00");
        assert!(json.get("Op").is_none());
    }

    #[test]
    fn integral_floats_are_accepted_for_counts() {
        let mut values = sample();
        values[8] = "12.0";
        values[12] = "";
        let pedido = Pedido::from_row(&row(values)).unwrap();
        assert_eq!(pedido.fabricadas, 12);
        assert_eq!(pedido.duracion_min, 0.0);
    }

    #[test]
    fn counts_outside_the_integer_range_are_rejected() {
        let mut values = sample();
        values[8] = "1e300";
        let err = Pedido::from_row(&row(values)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Decode);
        assert!(err.message().contains("Fabricadas"));

        let mut values = sample();
        values[8] = "-1e19";
        assert!(Pedido::from_row(&row(values)).is_err());
    }

    #[test]
    fn malformed_rows_are_decode_errors() {
        let short = vec![Some("1".to_string()); 3];
        assert_eq!(Pedido::from_row(&short).unwrap_err().kind(), &ErrorKind::Decode);

        let mut values = sample();
        values[0] = "";
        let err = Pedido::from_row(&row(values)).unwrap_err();
        assert!(err.message().contains("Pedido is missing"));

        let mut values = sample();
        values[12] = "noventa";
        let err = Pedido::from_row(&row(values)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Decode);
        assert!(err.message().contains("DuracionMin"));
    }
}
