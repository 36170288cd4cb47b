use serde::{Deserialize, Serialize};

/// Marks recorded on one day, summed across subjects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: String,
    pub present: u32,
    pub absent: u32,
    pub no_class: u32,
}

impl DailyStats {
    pub fn held(&self) -> u32 {
        self.present + self.absent
    }

    pub fn completion_ratio(&self) -> f64 {
        if self.held() == 0 {
            0.0
        } else {
            self.present as f64 / self.held() as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_ignores_no_class() {
        let day = DailyStats {
            date: "2026-08-03".to_string(),
            present: 3,
            absent: 1,
            no_class: 2,
        };
        assert_eq!(day.held(), 4);
        assert!((day.completion_ratio() - 0.75).abs() < f64::EPSILON);
        assert_eq!(DailyStats::default().completion_ratio(), 0.0);
    }
}
