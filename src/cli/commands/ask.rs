//! Ask Command
//!
//! Answer a question about one repository, or across every indexed one.

use crate::app::AppContext;
use crate::cli::Output;
use crate::types::Result;

pub enum AskScope<'a> {
    Repository(&'a str),
    Global,
}

pub async fn run(app: &AppContext, scope: AskScope<'_>, question: &str) -> Result<String> {
    let answer = match scope {
        AskScope::Repository(repo) => app.qa.answer(question, repo).await?,
        AskScope::Global => app.global_qa.answer(question).await?,
    };
    Output::new().body(&answer);
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::app_in;
    use crate::rag::NO_REPOSITORIES_MESSAGE;
    use crate::types::DocumateError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_repository_without_collections() {
        let temp = TempDir::new().unwrap();
        let app = app_in(temp.path());
        let result = run(&app, AskScope::Repository("ghost"), "What is it?").await;
        assert!(matches!(result, Err(DocumateError::CollectionNotFound { .. })));
    }

    #[tokio::test]
    async fn test_global_with_nothing_indexed() {
        let temp = TempDir::new().unwrap();
        let app = app_in(temp.path());
        let answer = run(&app, AskScope::Global, "Anything?").await.unwrap();
        assert_eq!(answer, NO_REPOSITORIES_MESSAGE);
    }
}
