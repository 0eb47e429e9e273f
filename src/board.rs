use crate::client::StoreClient;
use crate::errors::{BoardError, StoreError};
use crate::models::{
    BoardEntry, BoardItem, DailyTask, EntryId, LeaveStatus, MemberOverview, Task, TeamMember,
};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Proof that a load was started; `install` only accepts the snapshot
/// belonging to the newest ticket handed out so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// In-memory mirror of the remote task collections for one page or
/// session. Rebuilt wholesale by a load; mutations patch it
/// optimistically and roll the patch back if the store refuses. The
/// mirror is disposable — nothing here outlives the session.
#[derive(Debug, Default)]
pub struct Board {
    entries: Vec<BoardEntry>,
    members: Vec<TeamMember>,
    next_entry: u64,
    issued: u64,
    installed: u64,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[BoardEntry] {
        &self.entries
    }

    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    pub fn entry(&self, id: EntryId) -> Option<&BoardEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    fn alloc_id(&mut self) -> EntryId {
        self.next_entry += 1;
        EntryId(self.next_entry)
    }

    /// Starts a load. Tickets are monotonic; whichever load was
    /// *started* last wins, regardless of response arrival order.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket(self.issued)
    }

    /// Replaces the snapshot with a fetched one, unless a newer load
    /// has already installed. Returns whether the snapshot was taken.
    pub fn install(
        &mut self,
        ticket: LoadTicket,
        tasks: Vec<Task>,
        daily: Vec<DailyTask>,
    ) -> bool {
        if ticket.0 <= self.installed {
            warn!(
                ticket = ticket.0,
                installed = self.installed,
                "dropping superseded board snapshot"
            );
            return false;
        }
        self.installed = ticket.0;
        self.entries.clear();
        for task in tasks {
            let id = self.alloc_id();
            self.entries.push(BoardEntry {
                id,
                item: BoardItem::Task(task),
            });
        }
        for item in daily {
            let id = self.alloc_id();
            self.entries.push(BoardEntry {
                id,
                item: BoardItem::Daily(item),
            });
        }
        info!(entries = self.entries.len(), "board snapshot installed");
        true
    }

    /// Sequential ticket-fetch-install round-trip. This is the only
    /// operation that guarantees consistency with the store.
    pub async fn refresh(&mut self, client: &StoreClient) -> Result<(), StoreError> {
        let ticket = self.begin_load();
        let (tasks, daily) = client.fetch_board().await?;
        self.install(ticket, tasks, daily);
        Ok(())
    }

    pub async fn load_members(&mut self, client: &StoreClient) -> Result<(), StoreError> {
        self.members = client.list_members().await?;
        Ok(())
    }

    pub fn resolve_assignee_email(&self, name: &str) -> Option<String> {
        self.members
            .iter()
            .find(|member| member.name == name)
            .map(|member| member.email.clone())
    }

    /// Creates a ranged task: optimistic append, remote confirmation,
    /// rollback of the appended entry on failure. The assignee's email
    /// is filled from the member directory when known, so the store can
    /// send reminders; an unresolved assignee is not an error.
    pub async fn submit_task(
        &mut self,
        client: &StoreClient,
        mut task: Task,
    ) -> Result<EntryId, StoreError> {
        if task.email.is_none() {
            task.email = self.resolve_assignee_email(&task.assign);
        }
        let id = self.alloc_id();
        self.entries.push(BoardEntry {
            id,
            item: BoardItem::Task(task.clone()),
        });
        if let Err(err) = client.create_task(&task).await {
            self.entries.retain(|entry| entry.id != id);
            warn!(task = %task.taskname, "create refused, optimistic entry rolled back");
            return Err(err);
        }
        Ok(id)
    }

    pub async fn submit_daily(
        &mut self,
        client: &StoreClient,
        daily: DailyTask,
    ) -> Result<EntryId, StoreError> {
        let id = self.alloc_id();
        self.entries.push(BoardEntry {
            id,
            item: BoardItem::Daily(daily.clone()),
        });
        if let Err(err) = client.create_daily(&daily).await {
            self.entries.retain(|entry| entry.id != id);
            warn!(daily = %daily.name, "create refused, optimistic entry rolled back");
            return Err(err);
        }
        Ok(id)
    }

    /// Replaces an entry in place. The stored item's kind decides the
    /// endpoint, and the previous name is the remote key, so an edit
    /// that renames still addresses the row the store knows. On remote
    /// failure the previous item is restored.
    pub async fn update_entry(
        &mut self,
        client: &StoreClient,
        id: EntryId,
        item: BoardItem,
    ) -> Result<(), BoardError> {
        let pos = self.position(id).ok_or(BoardError::UnknownEntry(id))?;
        let previous = self.entries[pos].item.clone();
        if previous.is_daily() != item.is_daily() {
            return Err(BoardError::KindMismatch);
        }
        let remote_key = previous.name().to_string();

        self.entries[pos].item = item.clone();
        let result = match &item {
            BoardItem::Task(task) => client.update_task(&remote_key, task).await,
            BoardItem::Daily(daily) => client.update_daily(&remote_key, daily).await,
        };
        if let Err(err) = result {
            self.entries[pos].item = previous;
            warn!(entry = %remote_key, "update refused, previous item restored");
            return Err(err.into());
        }
        Ok(())
    }

    /// Removes an entry: optimistic removal, remote delete, reinsertion
    /// at the old position on failure. Unknown ids and keys already
    /// absent remotely are both success — delete is idempotent from the
    /// caller's perspective.
    pub async fn remove_entry(
        &mut self,
        client: &StoreClient,
        id: EntryId,
    ) -> Result<(), BoardError> {
        let Some(pos) = self.position(id) else {
            return Ok(());
        };
        let entry = self.entries.remove(pos);
        let result = match &entry.item {
            BoardItem::Task(task) => client.delete_task(&task.taskname).await,
            BoardItem::Daily(daily) => client.delete_daily(&daily.name).await,
        };
        if let Err(err) = result {
            let name = entry.item.name().to_string();
            self.entries.insert(pos.min(self.entries.len()), entry);
            warn!(entry = %name, "delete refused, entry restored");
            return Err(err.into());
        }
        Ok(())
    }

    /// Presence overview for every member in the directory: approved
    /// leave count plus today's presence mark.
    pub async fn member_overviews(
        &self,
        client: &StoreClient,
        today: NaiveDate,
    ) -> Result<Vec<MemberOverview>, StoreError> {
        let today_key = today.to_string();
        let mut overviews = Vec::with_capacity(self.members.len());
        for member in &self.members {
            let approved = client
                .list_leaves(Some(&member.name), Some(LeaveStatus::Approved))
                .await?;
            let presence = client
                .list_presence(&member.name, Some(&today_key))
                .await?;
            overviews.push(MemberOverview {
                member_name: member.name.clone(),
                approved_leaves: approved.len(),
                today_presence: presence.into_iter().next().map(|record| record.status),
            });
        }
        Ok(overviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::models::TaskStatus;

    fn task(name: &str) -> Task {
        Task {
            taskname: name.to_string(),
            assign: "Alice".to_string(),
            status: TaskStatus::Waiting,
            startdate: "2024-06-01".to_string(),
            enddate: "2024-06-05".to_string(),
            email: None,
            send_reminder: false,
        }
    }

    fn daily(name: &str, date: &str) -> DailyTask {
        DailyTask {
            name: name.to_string(),
            assign: String::new(),
            description: String::new(),
            date: date.to_string(),
        }
    }

    // nothing listens on port 9, so every remote call fails fast
    fn unreachable_client() -> StoreClient {
        StoreClient::new(ClientConfig::new("http://127.0.0.1:9")).unwrap()
    }

    #[test]
    fn install_merges_and_tags_daily_items() {
        let mut board = Board::new();
        let ticket = board.begin_load();
        assert!(board.install(ticket, vec![task("t1")], vec![daily("standup", "2024-06-01")]));

        assert_eq!(board.entries().len(), 2);
        assert!(!board.entries()[0].item.is_daily());
        assert!(board.entries()[1].item.is_daily());
        assert_eq!(board.entries()[1].item.status(), TaskStatus::Daily);
    }

    #[test]
    fn stale_snapshot_is_dropped() {
        let mut board = Board::new();
        let stale = board.begin_load();
        let fresh = board.begin_load();

        assert!(board.install(fresh, vec![task("new")], vec![]));
        assert!(!board.install(stale, vec![task("old")], vec![]));

        assert_eq!(board.entries().len(), 1);
        assert_eq!(board.entries()[0].item.name(), "new");
    }

    #[test]
    fn reinstall_assigns_fresh_ids() {
        let mut board = Board::new();
        let first = board.begin_load();
        board.install(first, vec![task("t1")], vec![]);
        let old_id = board.entries()[0].id;

        let second = board.begin_load();
        board.install(second, vec![task("t1")], vec![]);
        assert_ne!(board.entries()[0].id, old_id);
    }

    #[tokio::test]
    async fn removing_unknown_id_is_a_noop() {
        let mut board = Board::new();
        let ticket = board.begin_load();
        board.install(ticket, vec![task("t1")], vec![]);

        // never touches the network
        let client = unreachable_client();
        let ghost = EntryId(999);
        assert!(board.remove_entry(&client, ghost).await.is_ok());
        assert_eq!(board.entries().len(), 1);
    }

    #[tokio::test]
    async fn updating_unknown_id_is_an_error() {
        let mut board = Board::new();
        let client = unreachable_client();
        let err = board
            .update_entry(&client, EntryId(7), BoardItem::Task(task("t1")))
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::UnknownEntry(_)));
    }

    #[tokio::test]
    async fn update_cannot_change_entry_kind() {
        let mut board = Board::new();
        let ticket = board.begin_load();
        board.install(ticket, vec![task("t1")], vec![]);
        let id = board.entries()[0].id;

        let client = unreachable_client();
        let err = board
            .update_entry(&client, id, BoardItem::Daily(daily("t1", "2024-06-01")))
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::KindMismatch));
    }

    #[tokio::test]
    async fn failed_create_rolls_back_the_optimistic_entry() {
        let mut board = Board::new();
        let client = unreachable_client();

        let err = board.submit_task(&client, task("t1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Transport { .. }));
        assert!(board.entries().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_restores_the_entry_at_its_position() {
        let mut board = Board::new();
        let ticket = board.begin_load();
        board.install(ticket, vec![task("t1"), task("t2"), task("t3")], vec![]);
        let middle = board.entries()[1].id;

        let client = unreachable_client();
        assert!(board.remove_entry(&client, middle).await.is_err());

        let names: Vec<&str> = board.entries().iter().map(|e| e.item.name()).collect();
        assert_eq!(names, vec!["t1", "t2", "t3"]);
    }

    #[tokio::test]
    async fn failed_update_restores_the_previous_item() {
        let mut board = Board::new();
        let ticket = board.begin_load();
        board.install(ticket, vec![task("t1")], vec![]);
        let id = board.entries()[0].id;

        let mut edited = task("t1");
        edited.status = TaskStatus::Done;

        let client = unreachable_client();
        assert!(board.update_entry(&client, id, BoardItem::Task(edited)).await.is_err());
        assert_eq!(board.entries()[0].item.status(), TaskStatus::Waiting);
    }

    #[test]
    fn assignee_email_resolves_from_the_directory() {
        let mut board = Board::new();
        board.members = vec![TeamMember {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            team: "core".to_string(),
        }];

        assert_eq!(
            board.resolve_assignee_email("Alice").as_deref(),
            Some("alice@example.com")
        );
        assert_eq!(board.resolve_assignee_email("Mallory"), None);
    }
}
