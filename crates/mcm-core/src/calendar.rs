//! 生產日曆模型

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// 生產日曆，用於推算每年生產天數
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionCalendar {
    /// 生產日（週一到週日，true 表示生產日）
    /// 索引 0 = 週一, ..., 6 = 週日
    pub working_days: [bool; 7],

    /// 停工日
    pub shutdowns: Vec<NaiveDate>,

    pub calendar_id: String,
}

impl ProductionCalendar {
    /// 預設週一到週五生產
    pub fn new(calendar_id: &str) -> Self {
        Self {
            working_days: [true, true, true, true, true, false, false],
            shutdowns: Vec::new(),
            calendar_id: calendar_id.to_string(),
        }
    }

    /// 全年無休
    pub fn continuous(calendar_id: &str) -> Self {
        Self {
            working_days: [true; 7],
            shutdowns: Vec::new(),
            calendar_id: calendar_id.to_string(),
        }
    }

    /// 建構器模式：設置生產日
    pub fn with_working_days(mut self, working_days: [bool; 7]) -> Self {
        self.working_days = working_days;
        self
    }

    /// 建構器模式：設置停工日
    pub fn with_shutdowns(mut self, shutdowns: Vec<NaiveDate>) -> Self {
        self.shutdowns = shutdowns;
        self.shutdowns.sort();
        self.shutdowns.dedup();
        self
    }

    pub fn add_shutdown(&mut self, date: NaiveDate) {
        if let Err(pos) = self.shutdowns.binary_search(&date) {
            self.shutdowns.insert(pos, date);
        }
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        if self.shutdowns.binary_search(&date).is_ok() {
            return false;
        }
        let weekday_index = date.weekday().num_days_from_monday() as usize;
        self.working_days[weekday_index]
    }

    /// 指定年度的生產天數
    pub fn working_days_in_year(&self, year: i32) -> u32 {
        let Some(first) = NaiveDate::from_ymd_opt(year, 1, 1) else {
            return 0;
        };
        first
            .iter_days()
            .take_while(|d| d.year() == year)
            .filter(|d| self.is_working_day(*d))
            .count() as u32
    }
}

impl Default for ProductionCalendar {
    fn default() -> Self {
        Self::new("DEFAULT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeneralVariables;

    #[test]
    fn test_weekday_mask() {
        let calendar = ProductionCalendar::new("TEST");

        // 2025-10-06 是週一
        let monday = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2025, 10, 11).unwrap();
        assert!(calendar.is_working_day(monday));
        assert!(!calendar.is_working_day(saturday));
    }

    #[test]
    fn test_working_days_in_year() {
        // 2025 年共 261 個週間日
        let calendar = ProductionCalendar::new("TEST");
        assert_eq!(calendar.working_days_in_year(2025), 261);

        let continuous = ProductionCalendar::continuous("24/7");
        assert_eq!(continuous.working_days_in_year(2024), 366);
    }

    #[test]
    fn test_shutdowns() {
        let mut calendar = ProductionCalendar::new("TEST");
        let christmas = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
        calendar.add_shutdown(christmas);
        calendar.add_shutdown(christmas);

        assert_eq!(calendar.shutdowns.len(), 1);
        assert!(!calendar.is_working_day(christmas));
        assert_eq!(calendar.working_days_in_year(2025), 260);
    }

    #[test]
    fn test_general_variables_from_calendar() {
        let calendar = ProductionCalendar::new("TEST");
        let general = GeneralVariables::new(30.0, 100.0, 8.0, 0.0).with_calendar(&calendar, 2025);
        assert_eq!(general.product_days_per_year, 261.0);
        assert_eq!(general.annual_hours(), 2088.0);
    }
}
