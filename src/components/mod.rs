pub mod bracket;
pub mod cards;
pub mod match_card;
pub mod theme;
pub mod widgets;
