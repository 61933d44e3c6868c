use engine::{MoneyCents, Payment, SpenderLedger};

use crate::ReportError;

const TITLE: &str = "Friend Money Distribution";

/// Subject line of the email carrying `friend`'s report.
pub fn subject_for(friend: &str) -> String {
    format!("Money Distribution Details for {friend}")
}

/// Sum of the amounts still due across `payments`, `None` on overflow.
pub fn total_due(payments: &[Payment]) -> Option<MoneyCents> {
    payments
        .iter()
        .try_fold(MoneyCents::ZERO, |total, payment| total.checked_add(payment.due()))
}

/// Render `friend`'s ledger as plain text.
///
/// One section per spender, in ledger order: a `Spender:` line, one line per
/// payment, then the total still due to that spender. Totals never carry over
/// from one spender to the next. Fails only when a total overflows.
pub fn format_report(friend: &str, ledger: &SpenderLedger) -> Result<String, ReportError> {
    let mut content = format!("{TITLE}\nFriend: {friend}\n");

    for (spender, payments) in ledger {
        content.push_str(&format!("Spender: {spender}\n"));
        for payment in payments {
            let status = if payment.paid() { "Paid" } else { "Due" };
            content.push_str(&format!(
                "{spender} paid for {}: {} ({status})\n",
                payment.description(),
                payment.amount(),
            ));
        }
        let total = total_due(payments).ok_or_else(|| ReportError::Overflow {
            spender: spender.clone(),
        })?;
        content.push_str(&format!("Total amount due by {spender}: {total}\n"));
    }

    Ok(content)
}
