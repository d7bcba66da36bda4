use serde::Deserialize;

// Ответ stations_list: countries[].regions[].settlements[]

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StationsListResponse {
    #[serde(default)]
    pub countries: Vec<Country>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Country {
    #[serde(default)]
    pub regions: Vec<Region>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub settlements: Vec<Settlement>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Settlement {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub codes: Codes,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Codes {
    #[serde(default)]
    pub yandex_code: Option<String>,
}

// Ответ search: segments[]

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub segments: Vec<Segment>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub thread: Thread,
    #[serde(default)]
    pub from: Point,
    #[serde(default)]
    pub to: Point,
    #[serde(default)]
    pub departure: Option<String>,
    #[serde(default)]
    pub arrival: Option<String>,
    #[serde(default)]
    pub days: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Thread {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Тело ошибки 4xx: {"error": {"text": "..."}}
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorText,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ErrorText {
    #[serde(default)]
    pub text: String,
}
