use crate::errors::Result;
use crate::forecast::forecast_model::{
    ExpectedIncome, MonthlyForecast, WeeklyForecast, WhatIfForecast, WhatIfScenario,
};
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait ExpectedIncomeRepositoryTrait: Send + Sync {
    /// Active expected incomes of an owner dated within `[from, to]`.
    fn list_between(&self, owner_id: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<ExpectedIncome>>;
    async fn create(&self, income: ExpectedIncome) -> Result<ExpectedIncome>;
}

#[async_trait]
pub trait ForecastServiceTrait: Send + Sync {
    async fn monthly(&self, owner_id: &str, months: u32, today: NaiveDate) -> Result<MonthlyForecast>;

    async fn weekly(&self, owner_id: &str, weeks: u32, today: NaiveDate) -> Result<WeeklyForecast>;

    /// Projects `scenario` next to the unchanged baseline. Nothing is stored.
    async fn what_if(
        &self,
        owner_id: &str,
        months: u32,
        today: NaiveDate,
        scenario: WhatIfScenario,
    ) -> Result<WhatIfForecast>;
}
