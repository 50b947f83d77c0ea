pub mod chat;
pub mod membership;
pub mod participation;
pub mod poll_engine;

pub use chat::ClubChat;
pub use membership::{ClubUpdate, MembershipLedger, NewClub};
pub use participation::{EventWithAttendees, NewEvent, ParticipationLedger};
pub use poll_engine::{
    NewPoll, OptionTally, PollDetails, PollEngine, PollPolicy, PollUpdate, Tally,
};
