//! Serde model of the wttr.in `format=j1` payload, limited to the fields the
//! condition resolver reads. The provider reports numbers as strings.

#[derive(Debug, serde::Deserialize)]
pub(super) struct WttrResponse {
    pub(super) current_condition: Option<Vec<WttrCurrentCondition>>,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct WttrCurrentCondition {
    #[serde(rename = "localObsDateTime")]
    pub(super) local_obs_date_time: Option<String>,
    #[serde(rename = "temp_C")]
    pub(super) temp_c: Option<String>,
    #[serde(rename = "precipMM")]
    pub(super) precip_mm: Option<String>,
}
