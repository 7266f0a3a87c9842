use chrono::NaiveDate;

/// 每日计数器缓存键前缀
const DAILY_COUNTER_PREFIX: &str = "quota:daily:";

/// 生成指定日期（UTC）的每日计数器键
/// 键按日期确定性生成，同一天的所有调用方共享同一个计数器
pub fn daily_counter_key(day: NaiveDate) -> String {
    format!("{}{}", DAILY_COUNTER_PREFIX, day.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn key_uses_fixed_prefix_and_compact_date() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(daily_counter_key(day), "quota:daily:20260307");
    }

    proptest! {
        // 不同日期必须映射到不同的键，同一日期必须映射到同一个键
        #[test]
        fn distinct_days_get_distinct_keys(a in 0u32..20000, b in 0u32..20000) {
            let base = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
            let day_a = base + chrono::Days::new(a as u64);
            let day_b = base + chrono::Days::new(b as u64);
            prop_assert_eq!(day_a == day_b, daily_counter_key(day_a) == daily_counter_key(day_b));
        }

        #[test]
        fn key_date_part_is_eight_digits(offset in 0u32..20000) {
            let base = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
            let day = base + chrono::Days::new(offset as u64);
            let key = daily_counter_key(day);
            let date_part = key.strip_prefix("quota:daily:").unwrap();
            prop_assert_eq!(date_part.len(), 8);
            prop_assert!(date_part.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
