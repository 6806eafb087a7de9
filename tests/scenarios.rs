//! End-to-end scripts through the library entry point.

use jobqueue::config::QueueConfig;
use jobqueue::queue::JobRecord;

fn run(input: &str) -> (String, jobqueue::queue::IndexedJobQueue) {
    let mut out = Vec::new();
    let (_, queue) = jobqueue::run_script(input, &QueueConfig::default(), &mut out).unwrap();
    (String::from_utf8(out).unwrap(), queue)
}

fn ids<'a>(jobs: impl Iterator<Item = &'a JobRecord>) -> Vec<i64> {
    jobs.map(JobRecord::id).collect()
}

#[test]
fn test_enqueue_dequeue_promote_reorder() {
    let (out, queue) = run(
        "8
         A 5 2 1 30 100
         A 3 7 1 10 200
         A 8 1 2 20 300
         L
         R
         P 8 5
         O 1
         N",
    );

    assert!(out.contains(
        "List of jobs sorted by job IDs:\n\
         Job ID: 3, Priority: 7, Job Type: 1, CPU Time Consumed: 10, Memory Consumed: 200\n\
         Job ID: 5, Priority: 2, Job Type: 1, CPU Time Consumed: 30, Memory Consumed: 100\n\
         Job ID: 8, Priority: 1, Job Type: 2, CPU Time Consumed: 20, Memory Consumed: 300\n"
    ));
    assert!(out.contains(
        "Dequeued Job:\n\
         Job ID: 5, Priority: 2, Job Type: 1, CPU Time Consumed: 30, Memory Consumed: 100\n"
    ));
    assert!(out.contains(
        "Jobs after promotion:\n\
         Job ID: 8, Priority: 1, Job Type: 2, CPU Time Consumed: 20, Memory Consumed: 300\n\
         Job ID: 3, Priority: 7, Job Type: 1, CPU Time Consumed: 10, Memory Consumed: 200\n"
    ));
    assert!(out.ends_with("Number of elements in the queue: 2\n"));

    assert_eq!(ids(queue.display()), vec![3, 8]);
    assert_eq!(ids(queue.list_jobs()), vec![3, 8]);
}

#[test]
fn test_reorder_by_priority_aligns_both_views() {
    let (_, queue) = run(
        "5
         A 1 9 1 1 1
         A 2 4 1 1 1
         A 3 6 1 1 1
         A 4 1 1 1 1
         O 2",
    );
    assert_eq!(ids(queue.display()), vec![4, 2, 3, 1]);
    assert_eq!(ids(queue.list_jobs()), vec![4, 2, 3, 1]);
}

#[test]
fn test_reorder_by_cpu_time_then_enqueue() {
    let (_, queue) = run(
        "4
         A 1 1 1 30 1
         A 2 1 1 10 1
         O 3
         A 0 1 1 0 1",
    );
    // the new job goes to the logical tail but into id order in the array
    assert_eq!(ids(queue.display()), vec![2, 1, 0]);
    assert_eq!(ids(queue.list_jobs()), vec![0, 2, 1]);
}

#[test]
fn test_failures_do_not_stop_the_run() {
    let (out, queue) = run(
        "7
         R
         A 1 1 1 1 1
         A 1 2 2 2 2
         C 1 5 0
         P 9 1
         X
         N",
    );
    assert!(out.contains("Job ID 1 already exists!\n"));
    assert!(out.contains("Invalid field_index!\n"));
    assert!(out.contains("Job with ID 9 not found in the queue.\n"));
    assert!(out.contains("Invalid command!\n"));
    assert!(out.ends_with("Number of elements in the queue: 1\n"));
    assert_eq!(queue.get(1), Some(&JobRecord::new(1, 1, 1, 1, 1)));
}

#[test]
fn test_modify_then_change() {
    let (_, queue) = run(
        "3
         A 4 1 1 1 1
         M 4 2 3 4 5
         C 4 4 99",
    );
    assert_eq!(queue.get(4), Some(&JobRecord::new(4, 2, 3, 4, 99)));
}

#[test]
fn test_queue_grows_past_initial_capacity() {
    let mut script = String::from("25\n");
    for id in (0..25).rev() {
        script.push_str(&format!("A {id} 1 1 1 1\n"));
    }
    let (_, queue) = run(&script);
    assert_eq!(queue.count(), 25);
    assert_eq!(queue.capacity(), 40);
    assert_eq!(ids(queue.list_jobs()), (0..25).collect::<Vec<_>>());
    assert_eq!(ids(queue.display()), (0..25).rev().collect::<Vec<_>>());
}
