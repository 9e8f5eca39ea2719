mod profiles;
pub use profiles::ListProfiles;

mod entries;
pub use entries::AddEntry;

mod dashboard;
pub use dashboard::ShowDashboard;

mod history;
pub use history::ShowHistory;

mod session;
pub use session::Session;
