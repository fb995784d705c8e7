use crate::reports::LeagueReports;

#[derive(Clone)]
pub struct AppState {
    pub reports: LeagueReports,
}

impl AppState {
    pub fn new(reports: LeagueReports) -> Self {
        Self { reports }
    }
}
