pub use self::{game::*, participant::*, personality::*, role::*, team::*};

pub(crate) mod game;
pub(crate) mod participant;
pub(crate) mod personality;
pub(crate) mod role;
pub(crate) mod team;
