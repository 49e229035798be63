//! Message type ids.
//!
//! These numbers are the wire contract: once a peer has shipped with an
//! id, it never changes meaning.

pub const PUTPIECE: u32 = 1009;
pub const GAMETEXTMSG: u32 = 1010;
pub const GAMEMEMBERS: u32 = 1017;
pub const MOVEROBBER: u32 = 1034;
pub const SETTURN: u32 = 1055;
pub const LONGESTROAD: u32 = 1066;
pub const PLAYERELEMENTS: u32 = 1086;
pub const GAMESERVERTEXT: u32 = 1091;
pub const DICERESULTRESOURCES: u32 = 1092;
pub const REVEALFOGHEX: u32 = 1097;
pub const SVPTEXTMSG: u32 = 1099;
pub const LOCALIZEDSTRINGS: u32 = 1102;
pub const UNDONOTALLOWEDREASONTEXT: u32 = 1105;
pub const CHANGEGAMEOPTIONS: u32 = 1114;
pub const VERSION: u32 = 9998;
