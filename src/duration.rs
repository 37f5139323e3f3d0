/// Render a second count as `D:HH:MM:SS`, or `N seconds` up to a minute.
///
/// Each unit is gated on the absolute total rather than on whether a larger
/// unit was printed, so 3600 renders as `00:00` and 86400 as `00:00:00`.
/// Existing log files depend on this shape.
pub fn format_elapsed(total: u64) -> String {
    if total <= 60 {
        return format!("{} seconds", total);
    }

    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut out = String::new();
    if total > 86_400 {
        out.push_str(&format!("{}:", days));
    }
    if total > 3_600 {
        out.push_str(&format!("{:02}:", hours));
    }
    out.push_str(&format!("{:02}:{:02}", minutes, seconds));
    out
}
