//! Chat profiles: named system-instruction templates selecting the
//! assistant's tone and domain focus.

/// A canned opening prompt shown when a conversation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Starter {
    pub label: &'static str,
    pub message: &'static str,
}

/// The available chat profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Persona {
    #[default]
    GeneralChat,
    DayTrader,
    SwingTrader,
    LongTermInvestor,
    CryptoSpecialist,
}

impl Persona {
    pub const ALL: [Persona; 5] = [
        Persona::GeneralChat,
        Persona::DayTrader,
        Persona::SwingTrader,
        Persona::LongTermInvestor,
        Persona::CryptoSpecialist,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Persona::GeneralChat => "general_chat",
            Persona::DayTrader => "day_trader",
            Persona::SwingTrader => "swing_trader",
            Persona::LongTermInvestor => "long_term_investor",
            Persona::CryptoSpecialist => "crypto_specialist",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Persona::GeneralChat => "General Chat",
            Persona::DayTrader => "Day Trader",
            Persona::SwingTrader => "Swing Trader",
            Persona::LongTermInvestor => "Long Term Investor",
            Persona::CryptoSpecialist => "Crypto Specialist",
        }
    }

    /// Resolve a profile tag. Unknown tags fall back to the generic
    /// profile; selecting a profile never fails.
    pub fn parse(tag: &str) -> Persona {
        Persona::ALL
            .into_iter()
            .find(|p| p.tag() == tag)
            .unwrap_or_default()
    }

    /// Profile-specific addendum appended to the model-family base
    /// instruction when the prompt is assembled.
    pub fn context(self) -> &'static str {
        match self {
            Persona::GeneralChat => {
                "\n\nYou are a GENERAL AI ASSISTANT: You can help with any topic including \
                 writing, coding, learning, problem-solving, creative tasks, research, \
                 explanations, and general conversations. You are NOT focused on trading or \
                 finance unless specifically asked. Be helpful, informative, and adaptable \
                 to whatever the user needs assistance with."
            }
            Persona::DayTrader => {
                "\n\nYou are specialized in DAY TRADING: Focus on intraday opportunities, \
                 scalping, technical analysis, real-time market movements, and quick \
                 decision-making. Prioritize speed, efficiency, and risk management for \
                 short-term positions."
            }
            Persona::SwingTrader => {
                "\n\nYou are specialized in SWING TRADING: Focus on multi-day to multi-week \
                 positions, trend analysis, momentum plays, and medium-term market \
                 movements. Balance technical and fundamental analysis for optimal \
                 entry/exit timing."
            }
            Persona::LongTermInvestor => {
                "\n\nYou are specialized in LONG-TERM INVESTING: Focus on fundamental \
                 analysis, portfolio diversification, wealth building, dividend strategies, \
                 and multi-year positions. Emphasize research, patience, and compound \
                 growth strategies."
            }
            Persona::CryptoSpecialist => {
                "\n\nYou are specialized in CRYPTOCURRENCY: Focus on blockchain technology, \
                 DeFi protocols, altcoin analysis, NFT markets, crypto trading strategies, \
                 and emerging blockchain opportunities. Stay current with crypto news, \
                 regulatory changes, and market sentiment."
            }
        }
    }

    pub fn starters(self) -> &'static [Starter] {
        match self {
            Persona::GeneralChat => &[
                Starter {
                    label: "Code a Python function",
                    message: "Write a Python function that takes a list of numbers and \
                              returns the median value. Include error handling and docstring.",
                },
                Starter {
                    label: "Explain AI concepts simply",
                    message: "Explain how transformer neural networks work like I'm a \
                              curious 12-year-old who loves science.",
                },
            ],
            Persona::DayTrader => &[
                Starter {
                    label: "Market analysis today",
                    message: "Analyze today's market conditions and identify 3 high-potential \
                              trading opportunities with specific entry/exit strategies.",
                },
                Starter {
                    label: "Earnings play",
                    message: "Which companies have earnings this week that could move 5%+? \
                              Give me pre-earnings positioning strategies and post-earnings \
                              follow-up plans.",
                },
            ],
            Persona::SwingTrader => &[
                Starter {
                    label: "Hot stock picks",
                    message: "What are the top 5 undervalued stocks in tech and healthcare \
                              sectors right now? Include price targets and catalysts to watch.",
                },
                Starter {
                    label: "Options strategy",
                    message: "I'm bullish on NVDA but want to limit downside risk. Design an \
                              options strategy with specific strikes, expiration dates, and \
                              profit/loss scenarios.",
                },
            ],
            Persona::LongTermInvestor => &[
                Starter {
                    label: "Portfolio review",
                    message: "I have $50,000 to invest across stocks, crypto, and bonds. \
                              Create a diversified portfolio strategy based on current market \
                              conditions and my moderate risk tolerance.",
                },
            ],
            Persona::CryptoSpecialist => &[
                Starter {
                    label: "Crypto signals",
                    message: "Analyze Bitcoin, Ethereum, and 3 promising altcoins. Give me \
                              trading signals with risk management strategies for the next \
                              2 weeks.",
                },
            ],
        }
    }
}
