//! End-to-end scenarios for `BlockingRing`.

use ring_async::BlockingRing;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn s1_round_trip_2d() {
    let ring = BlockingRing::<i32>::new(2, 8);
    let ch0 = [1, 3, 5, 7, 9];
    let ch1 = [2, 4, 6, 8, 10];

    let written = ring.write_matrix(&[&ch0, &ch1]).await.unwrap();
    assert_eq!(written, 5);

    let matrix = ring.read_matrix(5).await.unwrap();
    assert_eq!(matrix, vec![vec![1, 3, 5, 7, 9], vec![2, 4, 6, 8, 10]]);
}

#[tokio::test]
async fn s2_flat_1d() {
    let ring = BlockingRing::<i32>::new(2, 8);
    let data: Vec<i32> = (1..=10).collect();

    let written = ring.write_flat(&data).await.unwrap();
    assert_eq!(written, 5);

    let mut out = [0i32; 10];
    let read = ring.read(&mut out, 5).await.unwrap();
    assert_eq!(read, 5);
    // Interleaved: [1,3,5,7,9] on channel 0, [2,4,6,8,10] on channel 1.
    assert_eq!(out, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
}

#[tokio::test]
async fn s3_wrong_channel_count() {
    let ring = BlockingRing::<i32>::new(2, 8);
    let bad = [[1, 2, 3].as_slice(), [4, 5, 6].as_slice(), [7, 8, 9].as_slice()];
    let err = ring.write_matrix(&bad).await.unwrap_err();
    assert!(err.is_argument_error());
}

#[tokio::test(start_paused = true)]
async fn s4_overflow_blocks_writer() {
    let ring = Arc::new(BlockingRing::<i32>::new(2, 8));

    let first: Vec<i32> = (1..=10).collect(); // 5 frames
    let written = ring.write_flat(&first).await.unwrap();
    assert_eq!(written, 5);

    let ring2 = Arc::clone(&ring);
    let second: Vec<i32> = (11..=20).collect(); // 5 more frames, only 3 fit
    let handle = tokio::spawn(async move { ring2.write_flat(&second).await.unwrap() });

    tokio::time::advance(Duration::from_millis(50)).await;
    assert!(!handle.is_finished(), "writer should still be blocked on overflow");

    let mut out = [0i32; 16];
    let read = ring.read(&mut out, 8).await.unwrap();
    assert_eq!(read, 8);

    let written2 = handle.await.unwrap();
    assert_eq!(written2, 5);
}

#[tokio::test(start_paused = true)]
async fn s5_underflow_blocks_reader() {
    let ring = Arc::new(BlockingRing::<i32>::new(2, 8));

    let first: Vec<i32> = (1..=6).collect(); // 3 frames
    ring.write_flat(&first).await.unwrap();

    let ring2 = Arc::clone(&ring);
    let handle = tokio::spawn(async move {
        let mut out = [0i32; 12];
        let read = ring2.read(&mut out, 6).await.unwrap();
        (read, out)
    });

    tokio::time::advance(Duration::from_millis(50)).await;
    assert!(!handle.is_finished(), "reader should still be blocked on underflow");

    let more: Vec<i32> = (7..=12).collect(); // 3 more frames
    ring.write_flat(&more).await.unwrap();

    let (read, out) = handle.await.unwrap();
    assert_eq!(read, 6);
    assert_eq!(&out[..12], &(1..=12).collect::<Vec<i32>>()[..]);
}

#[tokio::test]
async fn s6_close_cancels_in_progress() {
    let ring = Arc::new(BlockingRing::<i32>::new(2, 8));

    let ring1 = Arc::clone(&ring);
    let first: Vec<i32> = (0..20).collect(); // 10 frames, only 8 fit
    let t1 = tokio::spawn(async move { ring1.write_flat(&first).await.unwrap() });

    // Give t1 a chance to become the head and fill the ring.
    tokio::task::yield_now().await;

    let ring2 = Arc::clone(&ring);
    let second: Vec<i32> = (100..120).collect();
    let t2 = tokio::spawn(async move { ring2.write_flat(&second).await.unwrap() });

    tokio::task::yield_now().await;
    ring.close();

    let written1 = t1.await.unwrap();
    let written2 = t2.await.unwrap();
    assert_eq!(written1, 8);
    assert_eq!(written2, 0);
}

#[tokio::test]
async fn close_is_idempotent() {
    let ring = BlockingRing::<i32>::new(1, 4);
    ring.close();
    ring.close();
    assert!(!ring.is_open());

    let mut out = [0i32; 4];
    let read = ring.read(&mut out, 4).await.unwrap();
    assert_eq!(read, 0);
}

#[tokio::test]
async fn argument_error_reports_before_touching_ring_state() {
    let ring = BlockingRing::<i32>::new(2, 8);
    let short = [1i32, 2];
    let err = ring.write(&short, 4).await.unwrap_err();
    assert!(err.is_argument_error());
    assert_eq!(ring.readable_frames(), 0);
    assert_eq!(ring.writable_frames(), 8);
}
