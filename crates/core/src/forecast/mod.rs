//! Forecast module - monthly, weekly and what-if balance projections.

mod forecast_model;
mod forecast_service;
mod forecast_traits;
pub mod projection;

pub use forecast_model::{
    CashFlow, DateWindow, ExpectedIncome, FlowKind, MonthlyForecast, PeriodProjection,
    WeeklyForecast, WhatIfForecast, WhatIfScenario,
};
pub use forecast_service::ForecastEngine;
pub use forecast_traits::{ExpectedIncomeRepositoryTrait, ForecastServiceTrait};
