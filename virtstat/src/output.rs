// vim: tw=80
//! iostat-style text report

use std::{
    fmt::Display,
    io::{self, Write},
};

use chrono::{DateTime, TimeZone};
use virt_blkstat::RateSample;

const HEADER: [&str; 10] = ["Device:", "r/s", "w/s", "flush/s", "rkB/s",
    "wkB/s", "r_await", "w_await", "flush_await", "err/s"];

/// Write one tick's report: a timestamp, the column header, one row per disk
/// and a blank line.
pub fn write_report<'a, W, Tz, I>(out: &mut W, now: &DateTime<Tz>, rows: I)
    -> io::Result<()>
    where W: Write,
          Tz: TimeZone,
          Tz::Offset: Display,
          I: IntoIterator<Item = (&'a str, RateSample)>
{
    writeln!(out, "{}", now.format("%Y-%m-%d %H:%M:%S"))?;
    write_header(out)?;
    for (name, rates) in rows {
        write_row(out, name, &rates)?;
    }
    writeln!(out)
}

fn write_header<W: Write>(out: &mut W) -> io::Result<()> {
    let [dev, rest @ ..] = HEADER;
    write!(out, "{:<10}", dev)?;
    for h in rest {
        write!(out, "{:>12}", h)?;
    }
    writeln!(out)
}

fn write_row<W: Write>(out: &mut W, name: &str, r: &RateSample)
    -> io::Result<()>
{
    writeln!(out,
        "{:<10}{:>12}{:>12}{:>12}{:>12}{:>12}{:>12.2}{:>12.2}{:>12.2}{:>12}",
        name,
        r.r_s,
        r.w_s,
        r.flush_s,
        r.rkb_s,
        r.wkb_s,
        r.r_await,
        r.w_await,
        r.flush_await,
        r.err_s)
}

#[cfg(test)]
mod t {
    use chrono::Utc;

    use super::*;

    fn render(rows: Vec<(&str, RateSample)>) -> String {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let mut buf = Vec::new();
        write_report(&mut buf, &now, rows).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn words(line: &str) -> Vec<&str> {
        line.split_whitespace().collect()
    }

    #[test]
    fn timestamp() {
        let report = render(vec![]);
        assert_eq!(report.lines().next(), Some("2024-03-05 07:08:09"));
    }

    #[test]
    fn header() {
        let report = render(vec![]);
        let header = report.lines().nth(1).unwrap();
        assert_eq!(words(header), HEADER);
        assert_eq!(header.len(), 10 + 9 * 12);
        assert!(header.ends_with("       err/s"));
    }

    #[test]
    fn idle_disk() {
        let report = render(vec![("vda", RateSample::default())]);
        let row = report.lines().nth(2).unwrap();
        assert_eq!(words(row),
                   ["vda", "0", "0", "0", "0", "0", "0.00", "0.00", "0.00", "0"]);
    }

    #[test]
    fn busy_disk() {
        let rates = RateSample {
            r_s: 50,
            w_s: 30,
            rkb_s: 50,
            wkb_s: 30,
            r_await: 1.0,
            w_await: 0.533333,
            ..Default::default()
        };
        let report = render(vec![("vda", rates)]);
        let row = report.lines().nth(2).unwrap();
        assert_eq!(words(row),
                   ["vda", "50", "30", "0", "50", "30", "1.00", "0.53", "0.00",
                    "0"]);
    }

    /// Every row lines up with the header
    #[test]
    fn columns_align() {
        let rates = RateSample {
            r_s: 123456,
            flush_await: 12.345,
            ..Default::default()
        };
        let report = render(vec![("vda", RateSample::default()),
                                 ("sdb", rates)]);
        let lines = report.lines().collect::<Vec<_>>();
        for row in &lines[2..4] {
            assert_eq!(row.len(), lines[1].len());
        }
        assert!(lines[3].contains("      123456"));
        assert!(lines[3].contains("       12.35") ||
                lines[3].contains("       12.34"));
    }

    #[test]
    fn rows_in_order_then_blank() {
        let report = render(vec![("vdb", RateSample::default()),
                                 ("vda", RateSample::default())]);
        let lines = report.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("vdb"));
        assert!(lines[3].starts_with("vda"));
        assert_eq!(lines[4], "");
        assert!(report.ends_with("\n\n"));
    }
}
