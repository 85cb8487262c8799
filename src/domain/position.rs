//! Long-only position state machine.
//!
//! `Book` pairs cash with a `Position` that is either `Flat` or `Long`.
//! `Book::step` is a pure transition: it consumes the book and a signal and
//! returns the next book plus the trade event, if one happened.

use chrono::NaiveDateTime;
use std::fmt;
use tracing::{debug, warn};

use crate::domain::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeKind {
    Buy,
    Sell,
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeKind::Buy => f.pad("BUY"),
            TradeKind::Sell => f.pad("SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeEvent {
    pub timestamp: NaiveDateTime,
    pub kind: TradeKind,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Holding {
    pub shares: u64,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
}

impl Holding {
    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.shares as f64 * (price - self.entry_price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Flat,
    Long(Holding),
}

impl Position {
    pub fn is_long(&self) -> bool {
        matches!(self, Position::Long(_))
    }

    pub fn shares(&self) -> u64 {
        match self {
            Position::Flat => 0,
            Position::Long(h) => h.shares,
        }
    }
}

/// A completed buy/sell pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTrip {
    pub shares: u64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub pnl: f64,
}

/// Largest whole share count affordable with `capital` at `price`.
///
/// The quotient comes from the exact remainder (`capital % price`), not from
/// `capital / price`, whose rounding can land on the next integer. The cost
/// of the returned count never exceeds `capital`.
pub fn whole_shares(capital: f64, price: f64) -> u64 {
    if capital.is_nan() || price.is_nan() || capital <= 0.0 || price <= 0.0 {
        return 0;
    }
    let exact = (capital - capital % price) / price;
    let mut shares = exact.floor();
    if exact - shares > 0.5 {
        shares += 1.0;
    }
    let mut shares = shares as u64;
    while shares > 0 && shares as f64 * price > capital {
        shares -= 1;
    }
    shares
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Book {
    pub capital: f64,
    pub position: Position,
}

/// What a single transition produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Opened(TradeEvent),
    Closed(TradeEvent, RoundTrip),
}

impl Fill {
    pub fn event(&self) -> &TradeEvent {
        match self {
            Fill::Opened(e) | Fill::Closed(e, _) => e,
        }
    }
}

impl Book {
    pub fn new(capital: f64) -> Self {
        Book {
            capital,
            position: Position::Flat,
        }
    }

    /// Cash plus holdings valued at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        match self.position {
            Position::Flat => self.capital,
            Position::Long(h) => self.capital + h.market_value(price),
        }
    }

    /// Applies one signal at `close`. Signals that do not apply to the
    /// current state (buy while long, sell while flat, wait) leave the book
    /// untouched.
    pub fn step(self, timestamp: NaiveDateTime, close: f64, signal: Signal) -> (Book, Option<Fill>) {
        match (self.position, signal) {
            (Position::Flat, Signal::Buy) => {
                let (book, event) = self.open_long(timestamp, close);
                (book, Some(Fill::Opened(event)))
            }
            (Position::Long(holding), Signal::Sell) => {
                let (book, event, trip) = self.close_long(holding, timestamp, close);
                (book, Some(Fill::Closed(event, trip)))
            }
            _ => (self, None),
        }
    }

    fn open_long(self, timestamp: NaiveDateTime, price: f64) -> (Book, TradeEvent) {
        let shares = whole_shares(self.capital, price);
        if shares == 0 {
            warn!(%timestamp, price, capital = self.capital, "buy signal with capital below one share");
        }
        let capital = self.capital - shares as f64 * price;
        debug!(%timestamp, price, shares, capital, "opened long");

        let book = Book {
            capital,
            position: Position::Long(Holding {
                shares,
                entry_price: price,
                entry_time: timestamp,
            }),
        };
        let event = TradeEvent {
            timestamp,
            kind: TradeKind::Buy,
            price,
        };
        (book, event)
    }

    fn close_long(
        self,
        holding: Holding,
        timestamp: NaiveDateTime,
        price: f64,
    ) -> (Book, TradeEvent, RoundTrip) {
        let capital = self.capital + holding.market_value(price);
        debug!(%timestamp, price, shares = holding.shares, capital, "closed long");

        let trip = RoundTrip {
            shares: holding.shares,
            entry_price: holding.entry_price,
            exit_price: price,
            entry_time: holding.entry_time,
            exit_time: timestamp,
            pnl: holding.unrealized_pnl(price),
        };
        let book = Book {
            capital,
            position: Position::Flat,
        };
        let event = TradeEvent {
            timestamp,
            kind: TradeKind::Sell,
            price,
        };
        (book, event, trip)
    }
}
