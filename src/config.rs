use serde::Deserialize;
use time::{Date, OffsetDateTime, UtcOffset};

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentimentConfig {
    pub api_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub sentiment: SentimentConfig,
    /// Offset of the company's local calendar from UTC, in whole hours.
    pub timezone_offset_hours: i8,
    pub notification_retention_days: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "moodpulse".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "moodpulse-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
        };
        let sentiment = SentimentConfig {
            api_url: std::env::var("SENTIMENT_API_URL").unwrap_or_else(|_| {
                "https://language.googleapis.com/v1/documents:analyzeSentiment".into()
            }),
            api_key: std::env::var("SENTIMENT_API_KEY").unwrap_or_default(),
        };
        let timezone_offset_hours = std::env::var("TIMEZONE_OFFSET_HOURS")
            .ok()
            .and_then(|v| v.parse::<i8>().ok())
            .unwrap_or(7);
        let notification_retention_days = std::env::var("NOTIFICATION_RETENTION_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(30);
        Ok(Self {
            database_url,
            jwt,
            sentiment,
            timezone_offset_hours,
            notification_retention_days,
        })
    }

    pub fn utc_offset(&self) -> UtcOffset {
        UtcOffset::from_hms(self.timezone_offset_hours, 0, 0).unwrap_or(UtcOffset::UTC)
    }

    /// Current wall-clock time in the company timezone.
    pub fn local_now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.utc_offset())
    }

    /// Today's date in the company timezone. Check-in uniqueness is keyed on this.
    pub fn local_today(&self) -> Date {
        self.local_now().date()
    }
}
