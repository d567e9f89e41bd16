//! Discussion board screen.

use super::{ScreenMessage, ScreenScope, Session};
use crate::{
    core::MessRepository,
    models::{Discussion, DiscussionCategory, DiscussionFilter, DiscussionReply},
};

/// New-thread form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscussionDraft {
    /// Thread title
    pub title: String,
    /// Opening post
    pub content: String,
    /// Board to post to
    pub category: DiscussionCategory,
}

/// Discussion board with a category filter and a draft.
#[derive(Debug)]
pub struct DiscussScreen {
    mess: MessRepository,
    scope: ScreenScope,
    session: Session,
    /// Category shown
    pub filter: DiscussionFilter,
    /// Unsent new thread
    pub draft: DiscussionDraft,
    discussions: Vec<Discussion>,
    message: Option<ScreenMessage>,
}

impl DiscussScreen {
    /// An empty board for the session user.
    #[must_use]
    pub fn new(mess: MessRepository, session: Session) -> Self {
        Self {
            mess,
            scope: ScreenScope::new(),
            session,
            filter: DiscussionFilter::All,
            draft: DiscussionDraft::default(),
            discussions: Vec::new(),
            message: None,
        }
    }

    /// Mount scope of this screen.
    #[must_use]
    pub const fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    /// Inline message from the last operation.
    #[must_use]
    pub const fn message(&self) -> Option<&ScreenMessage> {
        self.message.as_ref()
    }

    /// Threads under the current filter, newest first.
    #[must_use]
    pub fn discussions(&self) -> &[Discussion] {
        &self.discussions
    }

    /// Reloads threads for the current filter.
    pub async fn load(&mut self) -> bool {
        let mess = self.mess.clone();
        let filter = self.filter;
        let Some(outcome) = self
            .scope
            .run(async move { mess.get_discussions(filter).await })
            .await
        else {
            return false;
        };

        match outcome {
            Ok(discussions) => {
                self.discussions = discussions;
                self.message = None;
                true
            }
            Err(e) => {
                self.message = Some(ScreenMessage::error(&e));
                false
            }
        }
    }

    /// Switches the category tab and reloads.
    pub async fn select_filter(&mut self, filter: DiscussionFilter) -> bool {
        self.filter = filter;
        self.load().await
    }

    /// Posts the draft as a new thread.
    pub async fn post(&mut self) -> bool {
        let discussion = Discussion::new(
            &self.session.user.uid,
            &self.session.user.email,
            self.session.display_name(),
            self.draft.title.trim(),
            self.draft.content.trim(),
            self.draft.category,
        );
        let mess = self.mess.clone();
        let posted = self
            .settle(async move { mess.create_discussion(discussion).await })
            .await;
        if posted {
            self.draft = DiscussionDraft::default();
        }
        posted
    }

    /// Adds a reply as the session user and reloads.
    pub async fn reply(&mut self, discussion_id: &str, content: &str) -> bool {
        let reply = DiscussionReply::new(
            &self.session.user.uid,
            &self.session.user.email,
            self.session.display_name(),
            content.trim(),
        );
        let mess = self.mess.clone();
        let id = discussion_id.to_string();
        self.settle(async move { mess.add_reply_to_discussion(&id, reply).await })
            .await
    }

    /// Likes a thread and reloads.
    pub async fn like(&mut self, discussion_id: &str) -> bool {
        let mess = self.mess.clone();
        let id = discussion_id.to_string();
        self.settle(async move { mess.like_discussion(&id).await })
            .await
    }

    /// Runs a write, then reloads on success or shows the error.
    async fn settle<F>(&mut self, write: F) -> bool
    where
        F: std::future::Future<Output = crate::errors::Result<bool>> + Send + 'static,
    {
        let Some(outcome) = self.scope.run(write).await else {
            return false;
        };
        match outcome {
            Ok(_) => self.load().await,
            Err(e) => {
                self.message = Some(ScreenMessage::error(&e));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::Result, test_utils::*};

    async fn screen(app: &TestApp) -> Result<DiscussScreen> {
        app.users
            .sign_up("asha@uni.edu", TEST_PASSWORD, "Asha", "Rao")
            .await?;
        let session = Session::load(&app.users).await?;
        Ok(DiscussScreen::new(app.mess.clone(), session))
    }

    #[tokio::test]
    async fn test_post_reply_like() -> Result<()> {
        let app = setup_test_app().await?;
        let mut screen = screen(&app).await?;

        screen.draft.title = "Queue at lunch".to_string();
        screen.draft.content = "Can we open a second counter?".to_string();
        screen.draft.category = DiscussionCategory::Suggestions;
        assert!(screen.post().await);
        assert_eq!(screen.draft, DiscussionDraft::default());

        let id = screen.discussions()[0].id.clone();
        assert_eq!(screen.discussions()[0].user_name, "Asha Rao");

        assert!(screen.reply(&id, "Agreed").await);
        assert!(screen.like(&id).await);
        assert!(screen.like(&id).await);

        let thread = &screen.discussions()[0];
        assert_eq!(thread.likes, 2);
        assert_eq!(thread.replies.len(), 1);
        assert_eq!(thread.replies[0].user_name, "Asha Rao");
        Ok(())
    }

    #[tokio::test]
    async fn test_filter_tabs() -> Result<()> {
        let app = setup_test_app().await?;
        let mut screen = screen(&app).await?;

        for (title, category) in [
            ("Menu change", DiscussionCategory::Announcements),
            ("Hi all", DiscussionCategory::General),
        ] {
            screen.draft.title = title.to_string();
            screen.draft.content = "text".to_string();
            screen.draft.category = category;
            assert!(screen.post().await);
        }
        assert_eq!(screen.discussions().len(), 2);

        assert!(
            screen
                .select_filter(DiscussionCategory::Announcements.into())
                .await
        );
        assert_eq!(screen.discussions().len(), 1);
        assert_eq!(screen.discussions()[0].title, "Menu change");
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_draft_is_rejected() -> Result<()> {
        let app = setup_test_app().await?;
        let mut screen = screen(&app).await?;
        assert!(!screen.post().await);
        assert!(screen.message().is_some_and(ScreenMessage::is_error));
        assert!(!screen.reply("missing", "hello").await);
        Ok(())
    }
}
