use marathon_core::NormalizedEventRecord;

const RUNNER: &str = "\u{1F3C3}\u{200D}\u{2642}\u{FE0F}";

/// Renders the notification text for a list of races.
///
/// ```text
/// 🏃‍♂️{title}🏃‍♂️
/// 제목: ...
/// 일시: 2024-03-01 09:00
/// 접수기간: 2024-01-01 ~ 2024-02-20
/// 장소: ...
/// 링크: ...
/// ```
///
/// One block per race, blocks separated by a single newline.
#[must_use]
pub fn format_marathon_message(title: &str, records: &[NormalizedEventRecord]) -> String {
    let blocks: Vec<String> = records.iter().map(format_block).collect();
    format!("{RUNNER}{title}{RUNNER}\n{}", blocks.join("\n"))
}

fn format_block(record: &NormalizedEventRecord) -> String {
    format!(
        "제목: {}\n일시: {}\n접수기간: {} ~ {}\n장소: {}\n링크: {}",
        record.title,
        record.race_date.format("%Y-%m-%d %H:%M"),
        record.registration_start_date.format("%Y-%m-%d"),
        record.registration_end_date.format("%Y-%m-%d"),
        record.location,
        record.homepage,
    )
    .trim()
    .to_string()
}
