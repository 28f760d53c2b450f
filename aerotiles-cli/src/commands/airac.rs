//! AIRAC calendar commands: current cycle, cycle-start check, upcoming cycles.

use std::io::Write;

use aerotiles::airac::{Clock, CycleCalculator};

use crate::error::CliError;

/// Cycles listed by `future` when no count is given.
pub const DEFAULT_FUTURE_COUNT: usize = 13;

/// Prints the current cycle, or only its identifier.
pub fn current<C: Clock>(
    calc: &CycleCalculator<C>,
    current_only: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let cycle = calc.current_cycle()?;
    if current_only {
        writeln!(out, "{}", cycle.ident())?;
    } else {
        writeln!(out, "Current AIRAC: {}", cycle.ident())?;
        writeln!(out, "Next cycle starts on: {}", cycle.next_start())?;
    }
    Ok(())
}

/// Prints `1` if today starts a cycle, `0` otherwise.
pub fn is_start<C: Clock>(calc: &CycleCalculator<C>, out: &mut impl Write) -> Result<(), CliError> {
    let flag = if calc.is_cycle_start_today() { "1" } else { "0" };
    writeln!(out, "{}", flag)?;
    Ok(())
}

/// Lists the next `count` cycles.
pub fn future<C: Clock>(
    calc: &CycleCalculator<C>,
    count: usize,
    out: &mut impl Write,
) -> Result<(), CliError> {
    for cycle in calc.future_cycles(count) {
        writeln!(out, "{} - starts on {}", cycle.ident(), cycle.start())?;
    }
    Ok(())
}

/// Resolves `--airac`: `latest` means the current cycle, anything else
/// must be a `YYNN` identifier.
pub fn resolve_cycle<C: Clock>(arg: &str, calc: &CycleCalculator<C>) -> Result<String, CliError> {
    let arg = arg.trim();
    if arg.eq_ignore_ascii_case("latest") {
        return Ok(calc.current_cycle()?.ident().to_string());
    }
    if arg.len() == 4 && arg.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(arg.to_string());
    }
    Err(CliError::Usage(format!(
        "Invalid AIRAC cycle '{}': expected YYNN (e.g. 2502) or 'latest'",
        arg
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerotiles::airac::FixedClock;
    use chrono::NaiveDate;

    fn calc_at(y: i32, m: u32, d: u32) -> CycleCalculator<FixedClock> {
        CycleCalculator::with_clock(
            NaiveDate::from_ymd_opt(2025, 1, 23).unwrap(),
            FixedClock(NaiveDate::from_ymd_opt(y, m, d).unwrap()),
        )
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<(), CliError>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_current_cycle_output() {
        let calc = calc_at(2025, 3, 1);
        assert_eq!(
            render(|out| current(&calc, false, out)),
            "Current AIRAC: 2502\nNext cycle starts on: 2025-03-20\n"
        );
        assert_eq!(render(|out| current(&calc, true, out)), "2502\n");
    }

    #[test]
    fn test_current_before_reference_fails() {
        let calc = calc_at(2025, 1, 1);
        let mut out = Vec::new();
        assert!(matches!(
            current(&calc, true, &mut out),
            Err(CliError::Airac(_))
        ));
    }

    #[test]
    fn test_is_start_flag() {
        assert_eq!(render(|out| is_start(&calc_at(2025, 2, 20), out)), "1\n");
        assert_eq!(render(|out| is_start(&calc_at(2025, 2, 21), out)), "0\n");
    }

    #[test]
    fn test_future_listing() {
        let text = render(|out| future(&calc_at(2025, 12, 30), 2, out));
        assert_eq!(
            text,
            "2601 - starts on 2026-01-22\n2602 - starts on 2026-02-19\n"
        );
    }

    #[test]
    fn test_resolve_cycle() {
        let calc = calc_at(2025, 3, 1);
        assert_eq!(resolve_cycle("latest", &calc).unwrap(), "2502");
        assert_eq!(resolve_cycle(" 2513 ", &calc).unwrap(), "2513");
        assert!(resolve_cycle("25-02", &calc).is_err());
        assert!(resolve_cycle("", &calc).is_err());
    }
}
