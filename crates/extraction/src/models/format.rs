use std::time::Duration;

/// Format a value as Brazilian currency, e.g. `R$ 45.230,50`
pub fn format_brl(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let reais = cents / 100;
    let centavos = cents % 100;

    let digits = reais.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, centavos)
}

/// Seconds with one decimal, e.g. `1.2`
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.1}", elapsed.as_secs_f64())
}
