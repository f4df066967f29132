use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::market::MarketSource;

/// Canonical column of the normalized schema.
///
/// `ChangeRate` and `AmplitudeRate` carry the numeric scale the source
/// returned; no percent/fraction conversion is applied.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    MarketSource,
    MarketType,
    TradeDate,
    SecurityCode,
    SecurityName,
    Open,
    High,
    Low,
    Last,
    PrevClose,
    ChangeAmount,
    ChangeRate,
    Volume,
    Amount,
    TradePhase,
    AmplitudeRate,
    SecuritySubtype,
}

impl CanonicalField {
    /// Columns prepended to every record.
    pub const CONTEXT: [CanonicalField; 3] = [
        CanonicalField::MarketSource,
        CanonicalField::MarketType,
        CanonicalField::TradeDate,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::MarketSource => "marketSource",
            Self::MarketType => "marketType",
            Self::TradeDate => "tradeDate",
            Self::SecurityCode => "securityCode",
            Self::SecurityName => "securityName",
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Last => "last",
            Self::PrevClose => "prevClose",
            Self::ChangeAmount => "changeAmount",
            Self::ChangeRate => "changeRate",
            Self::Volume => "volume",
            Self::Amount => "amount",
            Self::TradePhase => "tradePhase",
            Self::AmplitudeRate => "amplitudeRate",
            Self::SecuritySubtype => "securitySubtype",
        }
    }

    /// Localized label, as the exchanges' own reports name the column.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MarketSource => "交易所",
            Self::MarketType => "市场类型",
            Self::TradeDate => "交易日期",
            Self::SecurityCode => "证券代码",
            Self::SecurityName => "证券名称",
            Self::Open => "开盘价",
            Self::High => "最高价",
            Self::Low => "最低价",
            Self::Last => "最新价",
            Self::PrevClose => "昨收价",
            Self::ChangeAmount => "涨跌额",
            Self::ChangeRate => "涨跌幅",
            Self::Volume => "成交量",
            Self::Amount => "成交额",
            Self::TradePhase => "交易状态",
            Self::AmplitudeRate => "振幅",
            Self::SecuritySubtype => "证券类型",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Open
                | Self::High
                | Self::Low
                | Self::Last
                | Self::PrevClose
                | Self::ChangeAmount
                | Self::ChangeRate
                | Self::Volume
                | Self::Amount
                | Self::AmplitudeRate
        )
    }
}

/// How column headers are rendered for output.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStyle {
    /// Localized labels (`证券代码`, `开盘价`, ...)
    #[default]
    Localized,
    /// camelCase canonical keys (`securityCode`, `open`, ...)
    Canonical,
}

impl HeaderStyle {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "localized" => Some(Self::Localized),
            "canonical" => Some(Self::Canonical),
            _ => None,
        }
    }

    pub fn render(&self, field: CanonicalField) -> &'static str {
        match self {
            Self::Localized => field.label(),
            Self::Canonical => field.key(),
        }
    }
}

/// One normalized snapshot row.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub market_source: MarketSource,
    pub market_type: String,
    pub trade_date: NaiveDate,
    pub security_code: String,
    pub security_name: Option<String>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub last: Option<f64>,
    pub prev_close: Option<f64>,
    pub change_amount: Option<f64>,
    pub change_rate: Option<f64>,
    pub volume: Option<f64>,
    pub amount: Option<f64>,
    pub trade_phase: Option<String>,
    pub amplitude_rate: Option<f64>,
    pub security_subtype: Option<String>,
    /// Pass-through cells, aligned with [`CanonicalTable::extra_columns`]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<Option<String>>,
}

impl CanonicalRecord {
    /// An empty record carrying only the batch context.
    pub fn new(market_source: MarketSource, market_type: &str, trade_date: NaiveDate) -> Self {
        Self {
            market_source,
            market_type: market_type.to_string(),
            trade_date,
            security_code: String::new(),
            security_name: None,
            open: None,
            high: None,
            low: None,
            last: None,
            prev_close: None,
            change_amount: None,
            change_rate: None,
            volume: None,
            amount: None,
            trade_phase: None,
            amplitude_rate: None,
            security_subtype: None,
            extra: Vec::new(),
        }
    }

    pub fn numeric(&self, field: CanonicalField) -> Option<f64> {
        match field {
            CanonicalField::Open => self.open,
            CanonicalField::High => self.high,
            CanonicalField::Low => self.low,
            CanonicalField::Last => self.last,
            CanonicalField::PrevClose => self.prev_close,
            CanonicalField::ChangeAmount => self.change_amount,
            CanonicalField::ChangeRate => self.change_rate,
            CanonicalField::Volume => self.volume,
            CanonicalField::Amount => self.amount,
            CanonicalField::AmplitudeRate => self.amplitude_rate,
            _ => None,
        }
    }

    pub(crate) fn set_numeric(&mut self, field: CanonicalField, value: Option<f64>) {
        let slot = match field {
            CanonicalField::Open => &mut self.open,
            CanonicalField::High => &mut self.high,
            CanonicalField::Low => &mut self.low,
            CanonicalField::Last => &mut self.last,
            CanonicalField::PrevClose => &mut self.prev_close,
            CanonicalField::ChangeAmount => &mut self.change_amount,
            CanonicalField::ChangeRate => &mut self.change_rate,
            CanonicalField::Volume => &mut self.volume,
            CanonicalField::Amount => &mut self.amount,
            CanonicalField::AmplitudeRate => &mut self.amplitude_rate,
            _ => return,
        };
        *slot = value;
    }

    pub(crate) fn set_text(&mut self, field: CanonicalField, value: Option<String>) {
        match field {
            CanonicalField::SecurityCode => self.security_code = value.unwrap_or_default(),
            CanonicalField::SecurityName => self.security_name = value,
            CanonicalField::TradePhase => self.trade_phase = value,
            CanonicalField::SecuritySubtype => self.security_subtype = value,
            _ => {}
        }
    }

    /// Render one canonical column as an output cell.
    pub fn cell(&self, field: CanonicalField) -> String {
        match field {
            CanonicalField::MarketSource => self.market_source.id().to_string(),
            CanonicalField::MarketType => self.market_type.clone(),
            CanonicalField::TradeDate => self.trade_date.format("%Y-%m-%d").to_string(),
            CanonicalField::SecurityCode => self.security_code.clone(),
            CanonicalField::SecurityName => self.security_name.clone().unwrap_or_default(),
            CanonicalField::TradePhase => self.trade_phase.clone().unwrap_or_default(),
            CanonicalField::SecuritySubtype => self.security_subtype.clone().unwrap_or_default(),
            numeric => self
                .numeric(numeric)
                .map(|v| v.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Normalized rows of one (source, market type) pair for one as-of date.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTable {
    pub source: MarketSource,
    pub market_type: String,
    pub trade_date: NaiveDate,
    /// Canonical data columns populated by the schema, in mapping order
    pub columns: Vec<CanonicalField>,
    /// Raw headers passed through without a canonical counterpart
    pub extra_columns: Vec<String>,
    pub records: Vec<CanonicalRecord>,
}

impl CanonicalTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Header row: context columns, mapped columns, then pass-through headers.
    pub fn header(&self, style: HeaderStyle) -> Vec<String> {
        CanonicalField::CONTEXT
            .iter()
            .chain(self.columns.iter())
            .map(|field| style.render(*field).to_string())
            .chain(self.extra_columns.iter().cloned())
            .collect()
    }

    /// Data rows aligned with [`header`](Self::header).
    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.records.iter().map(move |record| {
            CanonicalField::CONTEXT
                .iter()
                .chain(self.columns.iter())
                .map(|field| record.cell(*field))
                .chain(
                    record
                        .extra
                        .iter()
                        .map(|cell| cell.clone().unwrap_or_default()),
                )
                .collect()
        })
    }
}
