//! The process-wide pool lives in a static, so these checks run in their own
//! test binary where it starts out empty.

use storage::repository::ContentRepository;
use storage::sqlite::shared_repository;

#[tokio::test]
async fn failed_init_is_retried_and_first_callers_share_one_pool() {
    let unreachable = "sqlite:///nonexistent-readrise-dir/readrise.db";
    assert!(shared_repository(unreachable).await.is_err());

    let url = "sqlite:file:memdb_shared_pool?mode=memory&cache=shared";
    let (a, b, c) = tokio::join!(
        shared_repository(url),
        shared_repository(url),
        shared_repository(url)
    );
    let (a, b, c) = (a.expect("first"), b.expect("second"), c.expect("third"));
    assert!(std::ptr::eq(a, b));
    assert!(std::ptr::eq(b, c));

    assert!(a.list_levels().await.unwrap().is_empty());
    let later = shared_repository(url).await.expect("later");
    assert!(std::ptr::eq(a, later));
}
