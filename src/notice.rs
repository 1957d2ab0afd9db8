//! Plain-text email bodies sent to residents
//!
//! Amounts are rounded to whole pesos here and nowhere else.

use crate::arrears::{LedgerEntry, LedgerStatus, UnitStatement};
use chrono::NaiveDate;
use std::fmt::Write;

/// Format an amount as whole currency units with dot separators: $70.800
pub fn money(val: f64) -> String {
    let rounded = val.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    if negative {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// dd/mm/yyyy
pub fn short_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Subject and body of an outgoing email
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub subject: String,
    pub body: String,
}

/// Receipt for an evaluated payment
pub fn payment_receipt(entry: &LedgerEntry) -> Notice {
    let subject = format!(
        "Comprobante de pago Gastos Comunes {} - Parcela {}",
        entry.period, entry.unit
    );

    let mut body = String::new();
    writeln!(body, "Estimado(a) residente de la parcela {}:", entry.unit).unwrap();
    writeln!(body).unwrap();
    writeln!(
        body,
        "Registramos su pago de Gastos Comunes correspondiente a {}.",
        entry.period
    ).unwrap();
    writeln!(body).unwrap();
    writeln!(body, "Cuota base:           {}", money(entry.base_fee)).unwrap();
    writeln!(body, "Fecha de vencimiento: {}", short_date(entry.due_date)).unwrap();
    writeln!(body, "Fecha de pago:        {}", short_date(entry.evaluated_on)).unwrap();
    if entry.is_late() {
        writeln!(body, "Meses de atraso:      {}", entry.months_overdue).unwrap();
        writeln!(body, "Interes (TIMC {}%):  {}", entry.rate_percent, money(entry.interest)).unwrap();
        writeln!(body, "Multa:                {}", money(entry.penalty)).unwrap();
    }
    writeln!(body, "Total adeudado:       {}", money(entry.debt)).unwrap();
    writeln!(body, "Monto pagado:         {}", money(entry.amount_paid.unwrap_or(0.0))).unwrap();
    if let Some(method) = &entry.method {
        writeln!(body, "Medio de pago:        {}", method).unwrap();
    }
    writeln!(body, "Estado:               {}", entry.status.label_es()).unwrap();

    writeln!(body).unwrap();
    match entry.status {
        LedgerStatus::PartialPayment => {
            writeln!(
                body,
                "Queda un saldo pendiente de {}. Le solicitamos regularizarlo a la brevedad.",
                money(entry.pending_debt)
            ).unwrap();
        }
        _ if entry.credit() > 0.0 => {
            writeln!(body, "Su pago deja un saldo a favor de {}.", money(entry.credit())).unwrap();
        }
        _ => {
            writeln!(body, "Gracias por mantener sus Gastos Comunes al dia.").unwrap();
        }
    }
    writeln!(body).unwrap();
    write!(body, "Administracion").unwrap();

    Notice { subject, body }
}

/// Reminder listing every period with money owed; None when nothing is owed
pub fn arrears_reminder(statement: &UnitStatement) -> Option<Notice> {
    let outstanding: Vec<&LedgerEntry> = statement.outstanding().collect();
    if outstanding.is_empty() {
        return None;
    }

    let subject = format!(
        "Aviso de deuda Gastos Comunes - Parcela {} - {}",
        statement.unit,
        money(statement.total_pending_debt())
    );

    let mut body = String::new();
    writeln!(body, "Estimado(a) residente de la parcela {}:", statement.unit).unwrap();
    writeln!(body).unwrap();
    writeln!(
        body,
        "Al {} registramos los siguientes Gastos Comunes pendientes:",
        short_date(statement.as_of)
    ).unwrap();
    writeln!(body).unwrap();
    for entry in &outstanding {
        writeln!(
            body,
            "- {:<16} vence {}  atraso {} mes(es)  interes {}  multa {}  pendiente {}",
            entry.period.label(),
            short_date(entry.due_date),
            entry.months_overdue,
            money(entry.interest),
            money(entry.penalty),
            money(entry.pending_debt)
        ).unwrap();
    }
    writeln!(body).unwrap();
    writeln!(body, "Total pendiente: {}", money(statement.total_pending_debt())).unwrap();
    writeln!(
        body,
        "Los montos se recalculan segun la fecha efectiva de pago."
    ).unwrap();
    writeln!(body).unwrap();
    write!(body, "Administracion").unwrap();

    Some(Notice { subject, body })
}
