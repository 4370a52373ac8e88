use core::fmt;

use crate::id::{SEQUENCE_BITS, SnowflakeId, TIMESTAMP_BITS, WORKER_ID_BITS};

struct Field {
    name: &'static str,
    bits: u32,
    value: u64,
}

impl Field {
    fn label(&self) -> String {
        format!("{} ({})", self.name, self.bits)
    }

    fn hex(&self) -> String {
        format!("0x{:x}", self.value)
    }

    fn width(&self) -> usize {
        let widest = self
            .label()
            .len()
            .max(self.value.to_string().len())
            .max(self.hex().len());
        widest + 2
    }
}

fn center(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(s.len());
    let left = pad / 2;
    format!("{}{s}{}", " ".repeat(left), " ".repeat(pad - left))
}

fn write_border(f: &mut fmt::Formatter<'_>, widths: &[usize]) -> fmt::Result {
    write!(f, "        +")?;
    for &w in widths {
        write!(f, "{}+", "-".repeat(w))?;
    }
    writeln!(f)
}

fn write_row(
    f: &mut fmt::Formatter<'_>,
    cells: impl Iterator<Item = String>,
    widths: &[usize],
) -> fmt::Result {
    write!(f, "        |")?;
    for (cell, &w) in cells.zip(widths) {
        write!(f, "{}|", center(&cell, w))?;
    }
    writeln!(f)
}

/// Renders an ID as a table of its bit fields, in decimal and hex.
pub(crate) fn write_bit_layout_debug(f: &mut fmt::Formatter<'_>, id: &SnowflakeId) -> fmt::Result {
    let fields = [
        Field {
            name: "reserved",
            bits: 1,
            value: 0,
        },
        Field {
            name: "timestamp",
            bits: TIMESTAMP_BITS,
            value: id.timestamp(),
        },
        Field {
            name: "worker ID",
            bits: WORKER_ID_BITS,
            value: id.worker_id(),
        },
        Field {
            name: "sequence",
            bits: SEQUENCE_BITS,
            value: id.sequence(),
        },
    ];
    let widths: Vec<usize> = fields.iter().map(Field::width).collect();

    writeln!(f, "SnowflakeId {{")?;
    writeln!(f, "    raw id     : 0x{:016x} ({})", id.to_raw(), id.to_raw())?;
    writeln!(f, "    padded     : {}", id.to_padded_string())?;
    writeln!(f, "    layout     :")?;
    write_border(f, &widths)?;
    write_row(f, fields.iter().map(Field::label), &widths)?;
    write_border(f, &widths)?;
    write_row(f, fields.iter().map(|field| field.value.to_string()), &widths)?;
    write_row(f, fields.iter().map(Field::hex), &widths)?;
    write_border(f, &widths)?;
    write!(f, "}}")
}
